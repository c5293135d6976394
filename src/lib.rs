//! 2D Bubble Simulation Library
//!
//! Fixed-timestep simulation of buoyant, deformable bubbles in a coarse
//! 2D fluid field:
//! - Fixed-capacity bubble pool with a dense active prefix
//! - Gravity, buoyancy, drag, and two-regime surface adhesion
//! - Pairwise collision with probabilistic fusion
//! - Two-way coupling with a damped fluid velocity grid
//!
//! The renderer is an external collaborator: it reads the pool's active
//! slice and the surface list each frame and feeds nothing back.

pub mod config;
pub mod physics;

pub use config::SimulationConfig;
pub use physics::{Bubble, BubbleGenerator, BubblePool, BubbleSimulator, Surface};
