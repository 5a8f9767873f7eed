//! Shared building blocks for the cabbeling experiment crates.
//!
//! - [`constraint`]: numeric invariants checked once at construction.
//! - [`Model`]: deterministic callables, used for pointwise field
//!   initializers and grid face functions handed to a simulation engine.

pub mod constraint;
mod model;

pub use model::Model;
