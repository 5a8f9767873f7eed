//! Seawater equation-of-state modeling for the cabbeling experiments.
//!
//! The setup crates only need the thermal expansion and haline contraction
//! coefficients at a reference state, but the models here provide density as
//! well so the regime of a two-layer configuration can be checked directly.

mod error;
mod state;

pub mod model;

pub use error::PropertyError;
pub use model::EquationOfState;
pub use state::SeawaterState;
