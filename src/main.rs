//! 2D Bubble Simulation
//!
//! Headless fixed-timestep driver: builds a world with a generating
//! bottom surface, steps it, and logs population statistics.

use clap::Parser;
use glam::Vec2;

use bubble_sim::config::SimulationConfig;
use bubble_sim::physics::{BubbleGenerator, BubblePool, BubbleSimulator, Surface};

/// 2D bubble simulation with surface adhesion and fusion
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// World width in world units
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// World height in world units
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Number of fixed timesteps to run
    #[arg(long, default_value_t = 3600)]
    steps: u32,

    /// Seed for the generator and simulator random streams
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Override the fusion probability
    #[arg(long)]
    fusion_probability: Option<f32>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = if let Some(ref path) = args.config {
        match SimulationConfig::from_file(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path);
                cfg
            }
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                SimulationConfig::default()
            }
        }
    } else {
        SimulationConfig::default()
    };

    if let Some(fusion_probability) = args.fusion_probability {
        config.collision.fusion_probability = fusion_probability;
    }

    let dt = config.dt;
    let mut pool = BubblePool::with_capacity(config.pool_capacity);
    let mut generator = BubbleGenerator::new(
        config.generation.clone(),
        config.physics.gas_density,
        args.seed,
    );
    let mut simulator = BubbleSimulator::new(config.clone(), args.width, args.height, args.seed);

    // Bottom surface generates bubbles; its derived normal already points
    // up for left-to-right endpoints, kept explicit here.
    simulator.add_surface(
        Surface::new(Vec2::new(50.0, 50.0), Vec2::new(args.width - 50.0, 50.0))
            .with_adhesion(0.8, 0.3)
            .with_normal(Vec2::new(0.0, 1.0))
            .generating(),
    );

    if config.generation.initial_count > 0 {
        generator.spawn_initial(
            &mut pool,
            config.generation.initial_count,
            simulator.bounds(),
        );
    }

    log::info!(
        "Starting simulation: {}x{} world, {} steps at dt={:.4}s, pool capacity {}",
        args.width,
        args.height,
        args.steps,
        dt,
        pool.capacity()
    );

    let report_interval = (1.0 / dt).round() as u32;
    let mut removed: i64 = 0;

    for step in 0..args.steps {
        generator.try_generate(&mut pool, simulator.surface_registry(), dt, simulator.bounds());
        let after_generation = pool.active_count();
        simulator.step(dt, &mut pool);

        removed += after_generation as i64 - pool.active_count() as i64;

        if report_interval > 0 && (step + 1) % report_interval == 0 {
            let on_surface = pool.active().iter().filter(|b| b.on_surface).count();
            let mean_radius = if pool.active_count() > 0 {
                pool.active().iter().map(|b| b.radius).sum::<f32>() / pool.active_count() as f32
            } else {
                0.0
            };
            log::info!(
                "t={:.1}s active={} on_surface={} mean_radius={:.1} removed={}",
                (step + 1) as f32 * dt,
                pool.active_count(),
                on_surface,
                mean_radius,
                removed
            );
        }
    }

    log::info!(
        "Finished: {} bubbles active, {} fused or popped over {} steps",
        pool.active_count(),
        removed,
        args.steps
    );
}
