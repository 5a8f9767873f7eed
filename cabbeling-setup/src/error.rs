use std::error::Error as StdError;

use cabbeling_core::constraint::{Finite, NonZero, StrictlyPositive};
use cabbeling_thermo::PropertyError;
use thiserror::Error;

use crate::artifact::ArtifactError;

/// Errors raised while building initial conditions, grids, or derived numbers.
///
/// All variants describe configuration mistakes; none are transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("grid stretching rate {stretching} is too close to zero")]
    DegenerateStretching { stretching: f64 },

    #[error("grid faces are not increasing at face {index}: z = {z} after {below}")]
    NonMonotonicGrid { index: usize, z: f64, below: f64 },

    #[error("non-finite {axis} coordinate: {value}")]
    InvalidCoordinate { axis: char, value: f64 },

    #[error("`{quantity}` is zero, the ratio is undefined")]
    DegenerateRatio { quantity: &'static str },
}

/// Errors raised while assembling or launching a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("equation of state evaluation failed")]
    Property(#[from] PropertyError),

    #[error("failed to persist run output")]
    Artifact(#[from] ArtifactError),

    #[error("simulation engine failed")]
    Engine(#[source] Box<dyn StdError + Send + Sync>),
}

impl SetupError {
    pub(crate) fn invalid(name: &'static str, reason: impl ToString) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.to_string(),
        }
    }
}

/// Returns `value` if it is finite.
pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, SetupError> {
    Finite::new(value)
        .map(|v| v.into_inner())
        .map_err(|err| SetupError::invalid(name, err))
}

/// Returns `value` if it is finite and greater than zero.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, SetupError> {
    finite(name, value)?;
    StrictlyPositive::new(value)
        .map(|v| v.into_inner())
        .map_err(|err| SetupError::invalid(name, err))
}

/// Returns `value` if it is finite and not zero.
pub(crate) fn non_zero(name: &'static str, value: f64) -> Result<f64, SetupError> {
    finite(name, value)?;
    NonZero::new(value)
        .map(|v| v.into_inner())
        .map_err(|err| SetupError::invalid(name, err))
}
