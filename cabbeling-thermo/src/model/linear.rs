use uom::si::{f64::MassDensity, mass_density::kilogram_per_cubic_meter};

use crate::{PropertyError, SeawaterState};

use super::EquationOfState;

/// A linear equation of state with constant buoyancy coefficients.
///
/// `ρ = ρ₀·(1 − α·(T − T₀) + β·(S − S₀))`
///
/// Useful for idealized runs and for tests that need exact coefficients.
/// A linear model cannot represent cabbeling itself, since mixing two parcels
/// always yields the mass-weighted mean density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearEos {
    /// Density at the reference state, in kg/m³.
    pub reference_density: f64,
    /// Reference salinity, in g/kg.
    pub reference_salinity: f64,
    /// Reference temperature, in °C.
    pub reference_temperature: f64,
    /// Thermal expansion coefficient, in 1/K.
    pub alpha: f64,
    /// Haline contraction coefficient, per g/kg.
    pub beta: f64,
}

impl Default for LinearEos {
    fn default() -> Self {
        Self {
            reference_density: 1027.8,
            reference_salinity: 34.7,
            reference_temperature: 0.5,
            alpha: 3.0e-5,
            beta: 7.8e-4,
        }
    }
}

impl EquationOfState for LinearEos {
    fn density(&self, state: &SeawaterState) -> Result<MassDensity, PropertyError> {
        state.validate()?;

        let dt = state.temperature_celsius() - self.reference_temperature;
        let ds = state.salinity - self.reference_salinity;
        let rho = self.reference_density * (1.0 - self.alpha * dt + self.beta * ds);

        if rho.is_finite() && rho > 0.0 {
            Ok(MassDensity::new::<kilogram_per_cubic_meter>(rho))
        } else {
            Err(PropertyError::Calculation(format!(
                "density must be positive and finite, got {rho}"
            )))
        }
    }

    /// Returns the constant `alpha`.
    fn thermal_expansion(&self, state: &SeawaterState) -> Result<f64, PropertyError> {
        state.validate()?;
        Ok(self.alpha)
    }

    /// Returns the constant `beta`.
    fn haline_contraction(&self, state: &SeawaterState) -> Result<f64, PropertyError> {
        state.validate()?;
        Ok(self.beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn reference_state_has_reference_density() -> Result<(), PropertyError> {
        let eos = LinearEos::default();
        let rho = eos.density(&SeawaterState::surface(34.7, 0.5))?;
        assert_relative_eq!(rho.get::<kilogram_per_cubic_meter>(), 1027.8, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn warmer_and_fresher_is_lighter() -> Result<(), PropertyError> {
        let eos = LinearEos::default();
        let reference = eos.density(&SeawaterState::surface(34.7, 0.5))?;
        let upper = eos.density(&SeawaterState::surface(34.6, 1.0))?;
        assert!(upper < reference);
        Ok(())
    }

    #[test]
    fn coefficients_are_constant() -> Result<(), PropertyError> {
        let eos = LinearEos {
            alpha: 2e-4,
            beta: 8e-4,
            ..LinearEos::default()
        };
        for (s, t) in [(30.0, -1.0), (34.7, 0.5), (36.0, 20.0)] {
            let state = SeawaterState::surface(s, t);
            assert_eq!(eos.thermal_expansion(&state)?, 2e-4);
            assert_eq!(eos.haline_contraction(&state)?, 8e-4);
        }
        Ok(())
    }
}
