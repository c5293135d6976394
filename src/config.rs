//! Configuration module for the bubble simulation parameters.
//!
//! Defines the parameter structures for the 2D bubble simulation,
//! including physics constants, collision response, surface adhesion,
//! fluid coupling, and bubble generation.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Global physics constants for the simulated world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsParameters {
    /// Gravitational acceleration (x, y components, units/s^2)
    pub gravity: [f32; 2],

    /// Density of the surrounding liquid (for 2D area calculations)
    pub water_density: f32,

    /// Density of the gas inside bubbles
    pub gas_density: f32,
}

impl Default for PhysicsParameters {
    fn default() -> Self {
        Self {
            gravity: [0.0, -50.0], // tuned for screen-space units
            water_density: 1.0,
            gas_density: 0.1,
        }
    }
}

/// Parameters governing bubble size and growth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BubbleParameters {
    /// Minimum bubble radius while active
    pub min_radius: f32,

    /// Maximum bubble radius; growth and fusion are clamped here
    pub max_radius: f32,

    /// Radius increment per second (dr/dt = const)
    pub growth_rate: f32,
}

impl Default for BubbleParameters {
    fn default() -> Self {
        Self {
            min_radius: 8.0,
            max_radius: 40.0,
            growth_rate: 1.5,
        }
    }
}

/// Bubble-bubble collision response parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionParameters {
    /// Spring stiffness of the penalty repulsion
    pub stiffness: f32,

    /// Damping of the relative normal velocity during contact
    pub damping: f32,

    /// Probability that an overlapping pair fuses, per contact per step
    pub fusion_probability: f32,
}

impl Default for CollisionParameters {
    fn default() -> Self {
        Self {
            stiffness: 900.0,
            damping: 15.0,
            fusion_probability: 0.01,
        }
    }
}

/// Default surface adhesion coefficients, used when a surface does not
/// override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdhesionParameters {
    /// Static friction coefficient (resists onset of sliding)
    pub static_coefficient: f32,

    /// Dynamic friction coefficient (resists ongoing sliding)
    pub dynamic_coefficient: f32,
}

impl Default for AdhesionParameters {
    fn default() -> Self {
        Self {
            static_coefficient: 0.5,
            dynamic_coefficient: 0.2,
        }
    }
}

/// Coarse fluid field parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluidParameters {
    /// Quadratic drag coefficient for bubble-fluid relative motion
    pub drag_coefficient: f32,

    /// Edge length of one grid cell (world units)
    pub cell_size: f32,

    /// Exponential velocity damping rate per second
    #[serde(default = "default_fluid_damping")]
    pub damping: f32,
}

fn default_fluid_damping() -> f32 {
    0.1
}

impl Default for FluidParameters {
    fn default() -> Self {
        Self {
            drag_coefficient: 0.1,
            cell_size: 20.0,
            damping: default_fluid_damping(),
        }
    }
}

/// Parameters for the stochastic bubble generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Base spawn probability per second per generating surface
    pub base_rate: f32,

    /// Multiplier applied to the base rate
    pub rate_multiplier: f32,

    /// Minimum radius of newly spawned bubbles
    pub spawn_radius_min: f32,

    /// Maximum radius of newly spawned bubbles
    pub spawn_radius_max: f32,

    /// Number of bubbles placed at random when seeding a fresh world
    #[serde(default)]
    pub initial_count: u32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            base_rate: 0.5,
            rate_multiplier: 20.0,
            spawn_radius_min: 8.0,
            spawn_radius_max: 15.0,
            initial_count: 0,
        }
    }
}

/// Complete simulation configuration combining all parameter groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Global physics constants
    pub physics: PhysicsParameters,

    /// Bubble size and growth
    pub bubble: BubbleParameters,

    /// Bubble-bubble collision response
    pub collision: CollisionParameters,

    /// Default surface adhesion coefficients
    #[serde(default)]
    pub adhesion: AdhesionParameters,

    /// Coarse fluid field
    pub fluid: FluidParameters,

    /// Stochastic bubble generation
    pub generation: GenerationParameters,

    /// Fixed capacity of the bubble pool
    #[serde(default = "default_pool_capacity")]
    pub pool_capacity: usize,

    /// Fixed simulation time step in seconds
    pub dt: f32,
}

fn default_pool_capacity() -> usize {
    256
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsParameters::default(),
            bubble: BubbleParameters::default(),
            collision: CollisionParameters::default(),
            adhesion: AdhesionParameters::default(),
            fluid: FluidParameters::default(),
            generation: GenerationParameters::default(),
            pool_capacity: default_pool_capacity(),
            dt: 1.0 / 120.0,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })?;
        serde_json::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|error| ConfigError::Serialize { error })?;
        fs::write(path.as_ref(), contents).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }

    /// Gravity as a vector.
    pub fn gravity(&self) -> Vec2 {
        Vec2::new(self.physics.gravity[0], self.physics.gravity[1])
    }
}

/// Error types for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error when reading or writing configuration files
    Io {
        path: std::path::PathBuf,
        error: std::io::Error,
    },
    /// JSON parsing error
    Parse {
        path: std::path::PathBuf,
        error: serde_json::Error,
    },
    /// JSON serialization error
    Serialize { error: serde_json::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(
                    formatter,
                    "Failed to read/write config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Parse { path, error } => {
                write!(
                    formatter,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Serialize { error } => {
                write!(formatter, "Failed to serialize config: {}", error)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Parse { error, .. } => Some(error),
            ConfigError::Serialize { error } => Some(error),
        }
    }
}
