//! Coarse 2D fluid velocity field.
//!
//! A grid of cell-center velocities covering the simulation bounds. This
//! is a damped stirring field, not a pressure-projected solver: cells are
//! damped each step, bubbles inject momentum into their neighborhood, and
//! point queries return the nearest cell's velocity.

use super::bubble::Bubble;
use glam::Vec2;

/// Fraction of a bubble's momentum handed to the fluid per stir.
const STIR_FACTOR: f32 = 0.1;

/// Coarse grid of fluid cell velocities.
#[derive(Debug)]
pub struct FluidGrid {
    width_cells: usize,
    height_cells: usize,
    cell_size: f32,
    damping: f32,
    velocities: Vec<Vec2>,
}

impl FluidGrid {
    /// Build a grid covering `width x height` world units, divided into
    /// cells of `cell_size`.
    pub fn new(width: f32, height: f32, cell_size: f32, damping: f32) -> Self {
        let width_cells = ((width / cell_size) as usize).max(1);
        let height_cells = ((height / cell_size) as usize).max(1);
        Self {
            width_cells,
            height_cells,
            cell_size,
            damping,
            velocities: vec![Vec2::ZERO; width_cells * height_cells],
        }
    }

    /// Rebuild the grid for new bounds, zeroing all velocities. This is an
    /// explicit viewport-change operation, never called during stepping.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width_cells = ((width / self.cell_size) as usize).max(1);
        self.height_cells = ((height / self.cell_size) as usize).max(1);
        self.velocities = vec![Vec2::ZERO; self.width_cells * self.height_cells];
    }

    /// Apply exponential velocity damping to every cell.
    pub fn advance(&mut self, dt: f32) {
        let factor = 1.0 - self.damping * dt;
        for velocity in &mut self.velocities {
            *velocity *= factor;
        }
    }

    /// Cell coordinates containing `position`, clamped to the grid.
    fn cell_index(&self, position: Vec2) -> (usize, usize) {
        let x = (position.x / self.cell_size).floor() as isize;
        let y = (position.y / self.cell_size).floor() as isize;
        (
            x.clamp(0, self.width_cells as isize - 1) as usize,
            y.clamp(0, self.height_cells as isize - 1) as usize,
        )
    }

    /// World-space center of the cell at `(x, y)`.
    fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) * self.cell_size,
            (y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Fluid velocity at a world position (nearest cell, not interpolated).
    /// Out-of-range positions clamp to the nearest edge cell.
    pub fn velocity_at(&self, position: Vec2) -> Vec2 {
        let (x, y) = self.cell_index(position);
        self.velocities[y * self.width_cells + x]
    }

    /// Scalar vorticity at a world position, by central differencing of
    /// neighboring cell velocities: `d(vy)/dx - d(vx)/dy`.
    ///
    /// Supports the (currently disabled) lift force extension.
    pub fn vorticity_at(&self, position: Vec2) -> f32 {
        let (x, y) = self.cell_index(position);
        let center = self.cell_center(x, y);
        let step = self.cell_size;

        let left = self.velocity_at(center - Vec2::new(step, 0.0));
        let right = self.velocity_at(center + Vec2::new(step, 0.0));
        let below = self.velocity_at(center - Vec2::new(0.0, step));
        let above = self.velocity_at(center + Vec2::new(0.0, step));

        let dvy_dx = (right.y - left.y) / (4.0 * step);
        let dvx_dy = (above.x - below.x) / (4.0 * step);
        dvy_dx - dvx_dy
    }

    /// Stir the fluid with a bubble's motion.
    ///
    /// Distributes an impulse proportional to `velocity * mass` over the
    /// 3x3 neighborhood around the bubble's cell, weighted by linear
    /// falloff of distance to each cell center over an influence radius of
    /// `1.5 * radius`. Cells outside the radius or the grid get nothing.
    pub fn apply_bubble_force(&mut self, bubble: &Bubble, dt: f32) {
        let (cx, cy) = self.cell_index(bubble.position);
        let influence_radius = bubble.radius * 1.5;
        let influence_sq = influence_radius * influence_radius;

        for y_offset in -1isize..=1 {
            for x_offset in -1isize..=1 {
                let x = cx as isize + x_offset;
                let y = cy as isize + y_offset;
                if x < 0
                    || x >= self.width_cells as isize
                    || y < 0
                    || y >= self.height_cells as isize
                {
                    continue;
                }
                let (x, y) = (x as usize, y as usize);
                let center = self.cell_center(x, y);
                let dist_sq = (bubble.position - center).length_squared();
                if dist_sq >= influence_sq {
                    continue;
                }
                let weight = 1.0 - dist_sq.sqrt() / influence_radius;
                let stir = bubble.velocity * bubble.mass * weight * STIR_FACTOR;
                // Divide by cell size as a stand-in for cell mass.
                self.velocities[y * self.width_cells + x] += stir * dt / self.cell_size;
            }
        }
    }

    pub fn width_cells(&self) -> usize {
        self.width_cells
    }

    pub fn height_cells(&self) -> usize {
        self.height_cells
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bubble(position: Vec2, velocity: Vec2, radius: f32) -> Bubble {
        let mut bubble = Bubble::default();
        bubble.init(0, position, radius, 0.1);
        bubble.velocity = velocity;
        bubble
    }

    #[test]
    fn test_grid_dimensions() {
        let grid = FluidGrid::new(800.0, 600.0, 20.0, 0.1);
        assert_eq!(grid.width_cells(), 40);
        assert_eq!(grid.height_cells(), 30);
    }

    #[test]
    fn test_advance_damps_velocities() {
        let mut grid = FluidGrid::new(100.0, 100.0, 20.0, 0.1);
        grid.velocities[0] = Vec2::new(10.0, -4.0);
        grid.advance(1.0);
        let expected = Vec2::new(9.0, -3.6); // v * (1 - 0.1)
        assert!((grid.velocities[0] - expected).length() < 1e-5);
    }

    #[test]
    fn test_velocity_at_clamps_out_of_range() {
        let mut grid = FluidGrid::new(100.0, 100.0, 20.0, 0.1);
        grid.velocities[0] = Vec2::new(3.0, 0.0); // cell (0, 0)
        let sampled = grid.velocity_at(Vec2::new(-500.0, -500.0));
        assert!((sampled - Vec2::new(3.0, 0.0)).length() < 1e-6);

        let last = grid.velocities.len() - 1;
        grid.velocities[last] = Vec2::new(0.0, 7.0);
        let sampled = grid.velocity_at(Vec2::new(1e6, 1e6));
        assert!((sampled - Vec2::new(0.0, 7.0)).length() < 1e-6);
    }

    #[test]
    fn test_bubble_stirs_its_own_cell() {
        let mut grid = FluidGrid::new(200.0, 200.0, 20.0, 0.1);
        // Bubble centered on the cell (2, 2) center so the weight is 1 there.
        let bubble = test_bubble(Vec2::new(50.0, 50.0), Vec2::new(100.0, 0.0), 10.0);
        grid.apply_bubble_force(&bubble, 0.01);

        let stirred = grid.velocity_at(Vec2::new(50.0, 50.0));
        assert!(stirred.x > 0.0);
        assert!(stirred.y.abs() < 1e-6);

        // Neighbor cell centers sit 20 units away, outside the 15-unit
        // influence radius for a radius-10 bubble.
        let neighbor = grid.velocity_at(Vec2::new(70.0, 50.0));
        assert!(neighbor.length() < 1e-6);
    }

    #[test]
    fn test_stationary_bubble_does_not_stir() {
        let mut grid = FluidGrid::new(200.0, 200.0, 20.0, 0.1);
        let bubble = test_bubble(Vec2::new(50.0, 50.0), Vec2::ZERO, 10.0);
        grid.apply_bubble_force(&bubble, 0.01);
        assert!(grid.velocity_at(Vec2::new(50.0, 50.0)).length() < 1e-6);
    }

    #[test]
    fn test_vorticity_zero_in_uniform_flow() {
        let mut grid = FluidGrid::new(200.0, 200.0, 20.0, 0.1);
        for velocity in &mut grid.velocities {
            *velocity = Vec2::new(5.0, 0.0);
        }
        assert!(grid.vorticity_at(Vec2::new(100.0, 100.0)).abs() < 1e-6);
    }

    #[test]
    fn test_vorticity_nonzero_in_shear_flow() {
        let mut grid = FluidGrid::new(200.0, 200.0, 20.0, 0.1);
        // vy increasing with x produces positive vorticity.
        for y in 0..grid.height_cells() {
            for x in 0..grid.width_cells() {
                grid.velocities[y * grid.width_cells + x] = Vec2::new(0.0, x as f32);
            }
        }
        assert!(grid.vorticity_at(Vec2::new(100.0, 100.0)) > 0.0);
    }

    #[test]
    fn test_resize_rebuilds_zeroed() {
        let mut grid = FluidGrid::new(100.0, 100.0, 20.0, 0.1);
        grid.velocities[0] = Vec2::new(1.0, 1.0);
        grid.resize(400.0, 200.0);
        assert_eq!(grid.width_cells(), 20);
        assert_eq!(grid.height_cells(), 10);
        assert!(grid.velocities.iter().all(|v| v.length() < 1e-6));
    }
}
