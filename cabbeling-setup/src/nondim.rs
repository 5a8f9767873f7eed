//! Non-dimensional numbers characterizing a two-layer experiment.
//!
//! ```text
//! Pr  = ν / κ_T
//! Sc  = ν / κ_S
//! Le  = κ_T / κ_S
//! Ra_ρ = (α·ΔT) / (β·ΔS) · (1 / Le)
//! ```
//!
//! `α` and `β` are evaluated once at the lower reference state, not at each
//! layer.

use serde::{Deserialize, Serialize};
use uom::si::kinematic_viscosity::square_meter_per_second;

use crate::{
    engine::{Closure, Diffusivity},
    error::{SetupError, finite},
    layer::TwoLayerParameters,
};

/// The dimensionless groups written alongside a run's output.
///
/// Serialized with the keys `Pr`, `Sc`, `Le`, and `Ra_ρ`. The density ratio
/// is omitted when the salinity contrast vanishes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonDimensionalReport {
    #[serde(rename = "Pr")]
    pub prandtl: f64,
    #[serde(rename = "Sc")]
    pub schmidt: f64,
    #[serde(rename = "Le")]
    pub lewis: f64,
    #[serde(rename = "Ra_ρ", default, skip_serializing_if = "Option::is_none")]
    pub density_ratio: Option<f64>,
}

/// Everything [`compute`] needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonDimensionalInput {
    pub closure: Closure,
    /// Thermal expansion coefficient, in 1/K.
    pub alpha: f64,
    /// Haline contraction coefficient, per g/kg.
    pub beta: f64,
    /// `T_upper − T_lower`, in °C.
    pub delta_temperature: f64,
    /// `S_upper − S_lower`, in g/kg.
    pub delta_salinity: f64,
}

impl NonDimensionalInput {
    /// Collects the layer differences from `params`.
    #[must_use]
    pub fn new(closure: Closure, alpha: f64, beta: f64, params: &TwoLayerParameters) -> Self {
        Self {
            closure,
            alpha,
            beta,
            delta_temperature: params.temperature().difference(),
            delta_salinity: params.salinity().difference(),
        }
    }
}

/// Computes `Pr`, `Sc`, `Le`, and `Ra_ρ`.
///
/// # Errors
///
/// - [`SetupError::DegenerateRatio`] if `κ_S`, `κ_T`, `β`, or `ΔS` is zero.
/// - [`SetupError::InvalidParameter`] if any input is non-finite or a
///   transport coefficient is negative.
pub fn compute(input: &NonDimensionalInput) -> Result<NonDimensionalReport, SetupError> {
    let mut report = compute_diffusive(&input.closure)?;

    let alpha = finite("alpha", input.alpha)?;
    let beta = divisor("beta", input.beta)?;
    let delta_t = finite("delta_temperature", input.delta_temperature)?;
    let delta_s = divisor("delta_salinity", input.delta_salinity)?;

    report.density_ratio = Some((alpha * delta_t) / (beta * delta_s) / report.lewis);
    Ok(report)
}

/// Computes `Pr`, `Sc`, and `Le` only.
///
/// Used when the salinity contrast is zero and `Ra_ρ` is undefined.
///
/// # Errors
///
/// - [`SetupError::DegenerateRatio`] if either diffusivity is zero.
/// - [`SetupError::InvalidParameter`] if any coefficient is non-finite or negative.
pub fn compute_diffusive(closure: &Closure) -> Result<NonDimensionalReport, SetupError> {
    let nu = transport("viscosity", closure.viscosity)?;
    let kappa_s = transport("salinity_diffusivity", closure.salinity_diffusivity)?;
    let kappa_t = transport("temperature_diffusivity", closure.temperature_diffusivity)?;

    let kappa_s = divisor("salinity_diffusivity", kappa_s)?;
    let kappa_t = divisor("temperature_diffusivity", kappa_t)?;

    Ok(NonDimensionalReport {
        prandtl: nu / kappa_t,
        schmidt: nu / kappa_s,
        lewis: kappa_t / kappa_s,
        density_ratio: None,
    })
}

fn transport(name: &'static str, value: Diffusivity) -> Result<f64, SetupError> {
    let value = finite(name, value.get::<square_meter_per_second>())?;
    if value < 0.0 {
        return Err(SetupError::invalid(name, "must not be negative"));
    }
    Ok(value)
}

fn divisor(name: &'static str, value: f64) -> Result<f64, SetupError> {
    let value = finite(name, value)?;
    if value == 0.0 {
        return Err(SetupError::DegenerateRatio { quantity: name });
    }
    Ok(value)
}
