//! Per-step simulation pipeline.
//!
//! Orchestrates, per fixed timestep: fluid advance, force accumulation,
//! bubble-bubble collision and fusion, bubble-surface collision and
//! adhesion, semi-implicit Euler integration with world-boundary handling,
//! growth, and the bubble-to-fluid coupling pass.

use super::bubble::{Bubble, BubblePool};
use super::fluid::FluidGrid;
use super::surface::{Surface, SurfaceRegistry};
use crate::config::SimulationConfig;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Restitution of the velocity component normal to a surface on impact.
const SURFACE_RESTITUTION: f32 = 0.3;
/// Velocity scale applied to the offending component at a world edge.
const BOUNDARY_DAMPING: f32 = -0.5;
/// Below this speed a bubble on a surface counts as at rest.
const STICK_SPEED_EPSILON: f32 = 0.01;
/// Squared-distance guard for coincident centers and contact points.
const MIN_SEPARATION_SQ: f32 = 1e-4;
/// Squared-magnitude guard before normalizing force or velocity vectors.
const FORCE_EPSILON_SQ: f32 = 1e-4;

/// Fixed-timestep simulator for the bubble world.
pub struct BubbleSimulator {
    config: SimulationConfig,
    bounds: Vec2,
    fluid: FluidGrid,
    surfaces: SurfaceRegistry,
    rng: StdRng,
}

impl BubbleSimulator {
    /// Create a simulator for a `width x height` world. `seed` drives the
    /// fusion trials, making runs reproducible.
    pub fn new(config: SimulationConfig, width: f32, height: f32, seed: u64) -> Self {
        let fluid = FluidGrid::new(width, height, config.fluid.cell_size, config.fluid.damping);
        Self {
            config,
            bounds: Vec2::new(width, height),
            fluid,
            surfaces: SurfaceRegistry::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Register a surface. Returns its id.
    ///
    /// Surfaces without an adhesion override take the configured default
    /// coefficients.
    pub fn add_surface(&mut self, mut surface: Surface) -> usize {
        if !surface.has_adhesion_override() {
            surface = surface.with_adhesion(
                self.config.adhesion.static_coefficient,
                self.config.adhesion.dynamic_coefficient,
            );
        }
        self.surfaces.add(surface)
    }

    /// All registered surfaces (read-only view for the renderer).
    pub fn surfaces(&self) -> &[Surface] {
        self.surfaces.surfaces()
    }

    /// The surface registry, for the generator.
    pub fn surface_registry(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub fn fluid(&self) -> &FluidGrid {
        &self.fluid
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Rebuild the world bounds and fluid grid for a new viewport. An
    /// explicit, infrequent operation; all fluid velocities reset to zero.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Vec2::new(width, height);
        self.fluid.resize(width, height);
    }

    /// Advance the simulation by one fixed timestep. A non-positive `dt`
    /// is a no-op.
    pub fn step(&mut self, dt: f32, pool: &mut BubblePool) {
        if dt <= 0.0 {
            return;
        }

        self.fluid.advance(dt);
        self.accumulate_forces(pool);
        self.handle_bubble_collisions(pool);
        self.handle_surface_collisions(pool, dt);
        self.integrate(pool, dt);
        self.grow(pool, dt);

        // Two-way coupling: surviving bubbles stir the fluid.
        for bubble in pool.active() {
            self.fluid.apply_bubble_force(bubble, dt);
        }
    }

    /// Reset force accumulators and add gravity, buoyancy, and drag.
    fn accumulate_forces(&self, pool: &mut BubblePool) {
        let gravity = self.config.gravity();
        let water_density = self.config.physics.water_density;
        let drag_coefficient = self.config.fluid.drag_coefficient;

        for bubble in pool.active_mut() {
            bubble.force = Vec2::ZERO;

            bubble.force += gravity * bubble.mass;
            // Buoyancy: displaced-fluid weight, opposing gravity.
            bubble.force += -gravity * (water_density * bubble.area());

            // Quadratic drag against the local fluid, scaled by mass/radius.
            let fluid_velocity = self.fluid.velocity_at(bubble.position);
            let relative_velocity = bubble.velocity - fluid_velocity;
            let relative_speed_sq = relative_velocity.length_squared();
            if relative_speed_sq > 1e-6 && bubble.radius > 0.01 {
                let factor = bubble.mass / bubble.radius;
                bubble.force -=
                    relative_velocity * (drag_coefficient * factor * relative_speed_sq.sqrt());
            }

            // Lift is intentionally disabled; it needs a better vorticity
            // estimate than FluidGrid::vorticity_at currently gives.
        }
    }

    /// Exhaustive pairwise scan over the active bubbles.
    ///
    /// Each overlapping pair first draws a fusion trial; repulsion and the
    /// positional correction then use the pre-fusion geometry either way.
    /// A fusion deactivates the second bubble mid-scan, relocating the last
    /// active bubble into its index; relocated entries are not re-examined
    /// against earlier indices within the same step.
    fn handle_bubble_collisions(&mut self, pool: &mut BubblePool) {
        let stiffness = self.config.collision.stiffness;
        let damping = self.config.collision.damping;
        let fusion_probability = self.config.collision.fusion_probability;

        let mut i = 0;
        while i < pool.active_count() {
            let mut j = i + 1;
            while j < pool.active_count() {
                let (p1, v1, r1, m1) = {
                    let b = pool.get(i);
                    (b.position, b.velocity, b.radius, b.mass)
                };
                let (p2, v2, r2, m2) = {
                    let b = pool.get(j);
                    (b.position, b.velocity, b.radius, b.mass)
                };

                let delta = p2 - p1;
                let dist_sq = delta.length_squared();
                let sum_radii = r1 + r2;

                if dist_sq < sum_radii * sum_radii && dist_sq > MIN_SEPARATION_SQ {
                    let fused = self.rng.random::<f32>() < fusion_probability;
                    if fused {
                        self.fuse(pool, i, j);
                    }

                    let dist = dist_sq.sqrt();
                    let normal = delta / dist; // from first toward second
                    let penetration = sum_radii - dist;

                    // Spring pushes the pair apart; damping opposes the
                    // relative normal velocity.
                    let normal_speed = (v2 - v1).dot(normal);
                    let force_on_first = normal * (damping * normal_speed - stiffness * penetration);

                    // Split the overlap correction in proportion to the
                    // other body's mass.
                    let correction = normal * (penetration * 0.5);
                    let total_mass = m1 + m2;

                    {
                        let first = pool.get_mut(i);
                        first.force += force_on_first;
                        first.position -= correction * (m2 / total_mass);
                    }
                    if !fused {
                        let second = pool.get_mut(j);
                        second.force -= force_on_first;
                        second.position += correction * (m1 / total_mass);
                    }
                }
                j += 1;
            }
            i += 1;
        }
    }

    /// Merge the bubble at `second` into the one at `first`: area-weighted
    /// centroid, momentum-conserving velocity, radius from the combined
    /// area clamped to the maximum. The absorbed slot is released.
    fn fuse(&mut self, pool: &mut BubblePool, first: usize, second: usize) {
        let gas_density = self.config.physics.gas_density;
        let max_radius = self.config.bubble.max_radius;

        let (p2, v2, m2, area2, absorbed_id) = {
            let b = pool.get(second);
            (b.position, b.velocity, b.mass, b.area(), b.id)
        };

        let survivor = pool.get_mut(first);
        let m1 = survivor.mass;
        let total_mass = m1 + m2;
        let total_area = survivor.area() + area2;

        survivor.position = (survivor.position * m1 + p2 * m2) / total_mass;
        survivor.velocity = (survivor.velocity * m1 + v2 * m2) / total_mass;
        survivor.radius = (total_area / PI).sqrt().min(max_radius);
        survivor.update_mass(gas_density);
        log::trace!("bubble {} absorbed bubble {}", survivor.id, absorbed_id);

        pool.deactivate(second);
    }

    /// Test every bubble against the surfaces in registry order; the first
    /// match wins and the bubble attaches to at most one surface per step.
    fn handle_surface_collisions(&self, pool: &mut BubblePool, dt: f32) {
        for bubble in pool.active_mut() {
            let previous_surface = bubble.surface_id;
            bubble.on_surface = false;

            for surface in self.surfaces.surfaces() {
                let closest = surface.closest_point(bubble.position);
                let to_bubble = bubble.position - closest;
                let dist_sq = to_bubble.length_squared();
                if dist_sq >= bubble.radius * bubble.radius {
                    continue;
                }

                bubble.on_surface = true;
                bubble.surface_id = Some(surface.id);
                if previous_surface != Some(surface.id) {
                    bubble.time_on_surface = 0.0;
                }

                // Push out along the contact direction, or along the normal
                // when the center sits exactly on the segment.
                if dist_sq > MIN_SEPARATION_SQ {
                    let dist = dist_sq.sqrt();
                    bubble.position += (to_bubble / dist) * (bubble.radius - dist);
                } else {
                    bubble.position += surface.normal * bubble.radius;
                }

                // Reflect the normal velocity component if moving in.
                let normal_speed = bubble.velocity.dot(surface.normal);
                if normal_speed < 0.0 {
                    bubble.velocity -= surface.normal * ((1.0 + SURFACE_RESTITUTION) * normal_speed);
                }

                self.apply_adhesion(bubble, surface, dt);
                break;
            }

            if !bubble.on_surface {
                bubble.surface_id = None;
                bubble.time_on_surface = 0.0;
            }
        }
    }

    /// Normal force magnitude pressing a bubble into a surface: buoyant
    /// load plus an impact estimate, floored at 1 as a safety threshold.
    fn normal_force_magnitude(&self, bubble: &Bubble, surface: &Surface, dt: f32) -> f32 {
        let buoyancy = -self.config.gravity() * (self.config.physics.water_density * bubble.area());
        let static_component = buoyancy.dot(surface.normal).abs();

        let impact = bubble.velocity.dot(surface.normal);
        let dynamic_component = bubble.mass * (-impact).max(0.0) / dt;

        (static_component + dynamic_component).max(1.0)
    }

    /// Two-regime friction for a bubble in surface contact.
    ///
    /// At rest, tangential drive within the static bound is cancelled and
    /// the bubble pinned; past the bound, or while sliding, dynamic
    /// friction opposes the tangential drive or motion.
    fn apply_adhesion(&self, bubble: &mut Bubble, surface: &Surface, dt: f32) {
        let normal_force = self.normal_force_magnitude(bubble, surface, dt);

        let tangent = surface.tangent();
        let tangential_scalar = bubble.force.dot(tangent);
        let tangential_force = tangent * tangential_scalar;

        let max_static = surface.static_adhesion * normal_force;

        if bubble.velocity.length_squared() < STICK_SPEED_EPSILON * STICK_SPEED_EPSILON {
            if tangential_force.length_squared() < max_static * max_static {
                // Static adhesion holds: cancel the drive, pin in place.
                bubble.force -= tangential_force;
                bubble.velocity = Vec2::ZERO;
            } else if tangential_force.length_squared() > FORCE_EPSILON_SQ {
                // Static bound broken; dynamic friction opposes the drive.
                bubble.force -=
                    tangential_force.normalize() * (surface.dynamic_adhesion * normal_force);
            }
        } else {
            // Already sliding: oppose the tangential velocity component.
            let tangential_velocity = tangent * bubble.velocity.dot(tangent);
            if tangential_velocity.length_squared() > FORCE_EPSILON_SQ {
                bubble.force -=
                    tangential_velocity.normalize() * (surface.dynamic_adhesion * normal_force);
            }
        }

        bubble.time_on_surface += dt;
    }

    /// Semi-implicit Euler integration with the world-boundary policy:
    /// left, right, and bottom edges reflect with damping, the top edge
    /// pops the bubble.
    fn integrate(&self, pool: &mut BubblePool, dt: f32) {
        let bounds = self.bounds;
        let mut index = 0;
        while index < pool.active_count() {
            let bubble = pool.get_mut(index);

            let acceleration = bubble.force / bubble.mass;
            bubble.velocity += acceleration * dt;
            bubble.position += bubble.velocity * dt;

            let radius = bubble.radius;
            if bubble.position.x - radius < 0.0 {
                bubble.position.x = radius;
                bubble.velocity.x *= BOUNDARY_DAMPING;
            } else if bubble.position.x + radius > bounds.x {
                bubble.position.x = bounds.x - radius;
                bubble.velocity.x *= BOUNDARY_DAMPING;
            }
            if bubble.position.y - radius < 0.0 {
                bubble.position.y = radius;
                bubble.velocity.y *= BOUNDARY_DAMPING;
            } else if bubble.position.y + radius > bounds.y {
                // Popped at the top. The swap pulls an unintegrated bubble
                // into this index, so do not advance.
                log::trace!("bubble {} popped at the top edge", bubble.id);
                pool.deactivate(index);
                continue;
            }
            index += 1;
        }
    }

    /// Linear radius growth toward the maximum, mass kept in sync.
    fn grow(&self, pool: &mut BubblePool, dt: f32) {
        let max_radius = self.config.bubble.max_radius;
        let rate = self.config.bubble.growth_rate;
        let gas_density = self.config.physics.gas_density;

        for bubble in pool.active_mut() {
            if bubble.radius < max_radius {
                bubble.radius = (bubble.radius + rate * dt).min(max_radius);
                bubble.update_mass(gas_density);
            }
        }
    }
}
