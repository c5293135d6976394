//! Physics simulation modules
//!
//! Contains the core of the 2D bubble simulation:
//! - Bubble: body state and the fixed-capacity pool
//! - Surface: static line segments with adhesion properties
//! - Fluid: coarse damped velocity grid with two-way bubble coupling
//! - Generator: stochastic spawning at generation surfaces
//! - Simulator: the fixed-timestep pipeline

pub mod bubble;
pub mod fluid;
pub mod generator;
pub mod simulator;
pub mod surface;

pub use bubble::{Bubble, BubbleId, BubblePool};
pub use fluid::FluidGrid;
pub use generator::BubbleGenerator;
pub use simulator::BubbleSimulator;
pub use surface::{Surface, SurfaceRegistry};
