//! Initial-condition and grid generation for two-layer cabbeling experiments.
//!
//! The crate turns a handful of physical parameters into everything a
//! simulation engine needs to start a run:
//!
//! - [`layer`]: regime variants and the derived two-layer parameters.
//! - [`grid`]: stretched vertical face coordinates.
//! - [`profile`]: pointwise tanh layer profiles with an optional perturbation.
//! - [`nondim`]: Prandtl, Schmidt, Lewis, and density-Rayleigh numbers.
//! - [`run`]: the assembled experiment, its time-step policy and output
//!   schedule, and the hand-off to an [`engine::SimulationEngine`].
//!
//! Everything except [`run::Experiment::launch`] is pure.

pub mod artifact;
pub mod config;
pub mod domain;
pub mod engine;
mod error;
pub mod grid;
pub mod layer;
pub mod nondim;
pub mod profile;
pub mod run;

pub use config::{ConfigError, ExperimentConfig};
pub use error::{RunError, SetupError};
