use uom::si::{
    f64::{MassDensity, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    thermodynamic_temperature::degree_celsius,
};

use crate::{PropertyError, SeawaterState};

/// Temperature step used for the central difference in [`EquationOfState::thermal_expansion`], in °C.
const TEMPERATURE_STEP: f64 = 0.01;

/// Salinity step used for the central difference in [`EquationOfState::haline_contraction`], in g/kg.
const SALINITY_STEP: f64 = 0.01;

/// Trait for seawater equation-of-state models.
///
/// Implementors provide density; the buoyancy coefficients default to
/// central differences of that density and may be overridden by models with
/// closed-form expressions.
pub trait EquationOfState {
    /// Returns the in-situ density at the given state.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if the state is invalid or the model
    /// cannot produce a physical density.
    fn density(&self, state: &SeawaterState) -> Result<MassDensity, PropertyError>;

    /// Returns the thermal expansion coefficient `α = -(1/ρ)(∂ρ/∂T)` in 1/K.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if any density evaluation fails.
    fn thermal_expansion(&self, state: &SeawaterState) -> Result<f64, PropertyError> {
        let t = state.temperature_celsius();
        let at = |t_c: f64| {
            state.with_temperature(ThermodynamicTemperature::new::<degree_celsius>(t_c))
        };

        let rho = kg_per_m3(self.density(state)?);
        let rho_plus = kg_per_m3(self.density(&at(t + TEMPERATURE_STEP))?);
        let rho_minus = kg_per_m3(self.density(&at(t - TEMPERATURE_STEP))?);

        finite_coefficient(
            "thermal expansion",
            -((rho_plus - rho_minus) / (2.0 * TEMPERATURE_STEP)) / rho,
        )
    }

    /// Returns the haline contraction coefficient `β = (1/ρ)(∂ρ/∂S)` per g/kg.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if any density evaluation fails.
    fn haline_contraction(&self, state: &SeawaterState) -> Result<f64, PropertyError> {
        let s = state.salinity;

        let rho = kg_per_m3(self.density(state)?);
        let rho_plus = kg_per_m3(self.density(&state.with_salinity(s + SALINITY_STEP))?);
        let rho_minus = kg_per_m3(
            self.density(&state.with_salinity((s - SALINITY_STEP).max(0.0)))?,
        );
        let step = s + SALINITY_STEP - (s - SALINITY_STEP).max(0.0);

        finite_coefficient("haline contraction", ((rho_plus - rho_minus) / step) / rho)
    }
}

fn kg_per_m3(density: MassDensity) -> f64 {
    density.get::<kilogram_per_cubic_meter>()
}

fn finite_coefficient(name: &str, value: f64) -> Result<f64, PropertyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PropertyError::Calculation(format!(
            "{name} coefficient is not finite ({value})"
        )))
    }
}
