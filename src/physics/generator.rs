//! Stochastic bubble generation at spawn surfaces.
//!
//! Each step, every surface flagged as a generation source independently
//! draws a Bernoulli trial; on success a bubble of random initial radius
//! appears just off a random point along the surface. Pool exhaustion
//! silently drops the spawn.

use super::bubble::{BubbleId, BubblePool};
use super::surface::SurfaceRegistry;
use crate::config::GenerationParameters;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Spawns bubbles from generation surfaces and hands out stable ids.
pub struct BubbleGenerator {
    params: GenerationParameters,
    gas_density: f32,
    next_id: BubbleId,
    rng: StdRng,
}

impl BubbleGenerator {
    /// Create a generator with an explicit seed for reproducible runs.
    pub fn new(params: GenerationParameters, gas_density: f32, seed: u64) -> Self {
        Self {
            params,
            gas_density,
            next_id: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn next_id(&mut self) -> BubbleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn random_spawn_radius(&mut self) -> f32 {
        let min = self.params.spawn_radius_min;
        let max = self.params.spawn_radius_max;
        min + self.rng.random::<f32>() * (max - min)
    }

    /// Run one generation pass over all surfaces.
    ///
    /// `bounds` is the world extent; spawns whose bubble would immediately
    /// cross a world edge are dropped, as are spawns when the pool is
    /// exhausted.
    pub fn try_generate(
        &mut self,
        pool: &mut BubblePool,
        surfaces: &SurfaceRegistry,
        dt: f32,
        bounds: Vec2,
    ) {
        let spawn_probability = self.params.base_rate * dt * self.params.rate_multiplier;

        for surface in surfaces.surfaces() {
            if !surface.allows_generation {
                continue;
            }
            if self.rng.random::<f32>() >= spawn_probability {
                continue;
            }

            let t = self.rng.random::<f32>();
            let radius = self.random_spawn_radius();
            // Start slightly outside the surface along its normal.
            let position = surface.point_at(t) + surface.normal * (radius * 1.1);

            let in_bounds = position.x > radius
                && position.x < bounds.x - radius
                && position.y > radius
                && position.y < bounds.y - radius;
            if !in_bounds {
                continue;
            }

            let Some(index) = pool.activate() else {
                log::debug!("bubble pool exhausted, dropping spawn on surface {}", surface.id);
                continue;
            };
            let id = self.next_id();
            let bubble = pool.get_mut(index);
            bubble.init(id, position, radius, self.gas_density);
            bubble.on_surface = true;
            bubble.surface_id = Some(surface.id);
        }
    }

    /// Seed the pool with `count` free-floating bubbles at uniform random
    /// positions, inset from the world edges. Stops early on exhaustion.
    pub fn spawn_initial(&mut self, pool: &mut BubblePool, count: u32, bounds: Vec2) {
        for _ in 0..count {
            let Some(index) = pool.activate() else {
                log::debug!("bubble pool exhausted during initial population");
                return;
            };
            let x = 25.0 + self.rng.random::<f32>() * (bounds.x - 50.0);
            let y = 25.0 + self.rng.random::<f32>() * (bounds.y - 50.0);
            let radius = self.random_spawn_radius();
            let id = self.next_id();
            pool.get_mut(index).init(id, Vec2::new(x, y), radius, self.gas_density);
        }
    }
}
