use thiserror::Error;

/// Failure to evaluate a seawater property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The state lies outside the physical range of the model, such as a
    /// negative salinity or a non-finite temperature.
    #[error("invalid seawater state: {0}")]
    InvalidInput(String),

    /// The model produced an unphysical result, such as a non-positive
    /// density or a non-finite buoyancy coefficient.
    #[error("seawater property evaluation failed: {0}")]
    Calculation(String),
}
