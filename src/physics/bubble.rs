//! Bubble body state and the fixed-capacity bubble pool.
//!
//! The pool owns all bubble storage. Active bubbles always occupy the
//! contiguous index range `[0, active_count)`; deactivation swaps the
//! vacated slot with the last active one so the prefix stays dense and
//! no allocation happens during steady-state simulation.

use glam::Vec2;
use std::f32::consts::PI;

/// Unique identifier for a bubble, stable for its whole active lifetime.
///
/// Storage indices are *not* stable: a swap-remove can relocate a bubble
/// to a different slot at any deactivation.
pub type BubbleId = u32;

/// A single simulated bubble.
#[derive(Debug, Clone)]
pub struct Bubble {
    /// Stable identifier, assigned at activation
    pub id: BubbleId,
    /// Center position in world space
    pub position: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Radius, always within the configured bounds while active
    pub radius: f32,
    /// Mass, kept equal to `gas_density * pi * radius^2`
    pub mass: f32,
    /// Per-step force accumulator
    pub force: Vec2,
    /// Whether the bubble currently contacts a surface
    pub on_surface: bool,
    /// Id of the attached surface, if any
    pub surface_id: Option<usize>,
    /// Seconds spent attached to the current surface
    pub time_on_surface: f32,
    /// Lifecycle flag; mirrors the pool's active prefix
    pub active: bool,
}

impl Bubble {
    /// Mass of a bubble with the given radius: `density * pi * r^2`
    /// (area stands in for volume in 2D).
    pub fn mass_for_radius(radius: f32, gas_density: f32) -> f32 {
        gas_density * PI * radius * radius
    }

    /// Reset a recycled slot to a freshly spawned bubble.
    pub fn init(&mut self, id: BubbleId, position: Vec2, radius: f32, gas_density: f32) {
        self.id = id;
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.radius = radius;
        self.force = Vec2::ZERO;
        self.on_surface = false;
        self.surface_id = None;
        self.time_on_surface = 0.0;
        self.active = true;
        self.update_mass(gas_density);
    }

    /// Recompute mass from the current radius. Must be called after every
    /// radius change.
    pub fn update_mass(&mut self, gas_density: f32) {
        self.mass = Self::mass_for_radius(self.radius, gas_density);
    }

    /// Area of the bubble disk (the 2D analog of volume).
    pub fn area(&self) -> f32 {
        PI * self.radius * self.radius
    }
}

impl Default for Bubble {
    fn default() -> Self {
        Self {
            id: 0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 0.0,
            mass: 0.0,
            force: Vec2::ZERO,
            on_surface: false,
            surface_id: None,
            time_on_surface: 0.0,
            active: false,
        }
    }
}

/// Fixed-capacity pool of bubbles with a dense active prefix.
#[derive(Debug)]
pub struct BubblePool {
    slots: Vec<Bubble>,
    active_count: usize,
}

impl BubblePool {
    /// Create a pool with the given fixed capacity. All slots start inactive.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Bubble::default(); capacity],
            active_count: 0,
        }
    }

    /// Claim the next free slot and return its index, or `None` when the
    /// pool is exhausted. The caller must fully initialize the slot.
    pub fn activate(&mut self) -> Option<usize> {
        if self.active_count == self.slots.len() {
            return None;
        }
        let index = self.active_count;
        self.active_count += 1;
        self.slots[index].active = true;
        Some(index)
    }

    /// Release the slot at `index`. A no-op if the slot is already outside
    /// the active prefix.
    ///
    /// Unless `index` was the last active slot, the former last active
    /// bubble is relocated into `index` to keep the prefix dense. Any loop
    /// over the active range must account for that relocation.
    pub fn deactivate(&mut self, index: usize) {
        if index >= self.active_count {
            return;
        }
        self.active_count -= 1;
        self.slots[index].active = false;
        if index != self.active_count {
            self.slots.swap(index, self.active_count);
        }
    }

    /// The active bubbles, as a contiguous slice.
    pub fn active(&self) -> &[Bubble] {
        &self.slots[..self.active_count]
    }

    /// Mutable view of the active bubbles.
    pub fn active_mut(&mut self) -> &mut [Bubble] {
        &mut self.slots[..self.active_count]
    }

    /// Number of active bubbles.
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Total capacity (never changes).
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Borrow the bubble at an active index.
    pub fn get(&self, index: usize) -> &Bubble {
        debug_assert!(index < self.active_count);
        &self.slots[index]
    }

    /// Mutably borrow the bubble at an active index.
    pub fn get_mut(&mut self, index: usize) -> &mut Bubble {
        debug_assert!(index < self.active_count);
        &mut self.slots[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contiguity_holds(pool: &BubblePool) -> bool {
        let active = pool.active_count();
        pool.active().iter().all(|b| b.active)
            && pool.slots[active..].iter().all(|b| !b.active)
    }

    #[test]
    fn test_mass_matches_radius() {
        let mut bubble = Bubble::default();
        bubble.init(0, Vec2::ZERO, 10.0, 0.1);
        let expected = 0.1 * PI * 100.0;
        assert!((bubble.mass - expected).abs() < 1e-4);

        bubble.radius = 20.0;
        bubble.update_mass(0.1);
        assert!((bubble.mass - 0.1 * PI * 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_activate_until_exhausted() {
        let mut pool = BubblePool::with_capacity(3);
        assert_eq!(pool.activate(), Some(0));
        assert_eq!(pool.activate(), Some(1));
        assert_eq!(pool.activate(), Some(2));
        assert_eq!(pool.activate(), None);
        assert_eq!(pool.active_count(), 3);
        assert!(contiguity_holds(&pool));
    }

    #[test]
    fn test_deactivate_last_slot() {
        let mut pool = BubblePool::with_capacity(4);
        for i in 0..3 {
            let idx = pool.activate().unwrap();
            pool.get_mut(idx).init(i as BubbleId, Vec2::ZERO, 8.0, 0.1);
        }
        pool.deactivate(2);
        assert_eq!(pool.active_count(), 2);
        assert!(contiguity_holds(&pool));
        assert_eq!(pool.get(0).id, 0);
        assert_eq!(pool.get(1).id, 1);
    }

    #[test]
    fn test_deactivate_swaps_last_active_in() {
        let mut pool = BubblePool::with_capacity(4);
        for i in 0..4 {
            let idx = pool.activate().unwrap();
            pool.get_mut(idx).init(i as BubbleId, Vec2::ZERO, 8.0, 0.1);
        }
        pool.deactivate(1);
        assert_eq!(pool.active_count(), 3);
        assert!(contiguity_holds(&pool));
        // Former last active (id 3) relocated into the freed slot.
        assert_eq!(pool.get(1).id, 3);
    }

    #[test]
    fn test_deactivate_out_of_range_is_noop() {
        let mut pool = BubblePool::with_capacity(4);
        pool.activate().unwrap();
        pool.deactivate(3);
        pool.deactivate(1);
        assert_eq!(pool.active_count(), 1);
        assert!(contiguity_holds(&pool));
    }

    #[test]
    fn test_contiguity_after_mixed_lifecycle() {
        let mut pool = BubblePool::with_capacity(8);
        for i in 0..8 {
            let idx = pool.activate().unwrap();
            pool.get_mut(idx).init(i as BubbleId, Vec2::ZERO, 8.0, 0.1);
        }
        pool.deactivate(0);
        pool.deactivate(5);
        pool.deactivate(2);
        assert_eq!(pool.active_count(), 5);
        assert!(contiguity_holds(&pool));

        // Freed slots are reusable.
        let idx = pool.activate().unwrap();
        assert_eq!(idx, 5);
        pool.get_mut(idx).init(100, Vec2::ZERO, 8.0, 0.1);
        assert_eq!(pool.active_count(), 6);
        assert!(contiguity_holds(&pool));
    }
}
