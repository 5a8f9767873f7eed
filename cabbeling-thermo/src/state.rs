use cabbeling_core::constraint::Finite;
use uom::si::{
    f64::{Pressure, ThermodynamicTemperature},
    pressure::kilopascal,
    thermodynamic_temperature::degree_celsius,
};

use crate::PropertyError;

/// Represents the state of a seawater parcel.
///
/// Salinity is practical salinity (numerically g/kg), the unit the layer
/// definitions use. Pressure is gauge pressure, zero at the sea surface.
///
/// # Example
///
/// ```
/// use cabbeling_thermo::SeawaterState;
///
/// let state = SeawaterState::surface(34.7, 0.5);
/// assert_eq!(state.salinity, 34.7);
/// assert!((state.temperature_celsius() - 0.5).abs() < 1e-12);
/// assert_eq!(state.pressure_dbar(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeawaterState {
    pub salinity: f64,
    pub temperature: ThermodynamicTemperature,
    pub pressure: Pressure,
}

impl SeawaterState {
    /// Creates a new state with the given salinity, temperature, and pressure.
    #[must_use]
    pub fn new(salinity: f64, temperature: ThermodynamicTemperature, pressure: Pressure) -> Self {
        Self {
            salinity,
            temperature,
            pressure,
        }
    }

    /// Creates a state at the sea surface from salinity and temperature in °C.
    #[must_use]
    pub fn surface(salinity: f64, temperature_celsius: f64) -> Self {
        Self {
            salinity,
            temperature: ThermodynamicTemperature::new::<degree_celsius>(temperature_celsius),
            pressure: Pressure::new::<kilopascal>(0.0),
        }
    }

    /// Returns a new state with the given salinity, keeping other fields unchanged.
    #[must_use]
    pub fn with_salinity(self, salinity: f64) -> Self {
        Self { salinity, ..self }
    }

    /// Returns a new state with the given temperature, keeping other fields unchanged.
    #[must_use]
    pub fn with_temperature(self, temperature: ThermodynamicTemperature) -> Self {
        Self {
            temperature,
            ..self
        }
    }

    /// Returns the temperature in °C.
    #[must_use]
    pub fn temperature_celsius(&self) -> f64 {
        self.temperature.get::<degree_celsius>()
    }

    /// Returns the pressure in decibar, the customary oceanographic unit.
    #[must_use]
    pub fn pressure_dbar(&self) -> f64 {
        self.pressure.get::<kilopascal>() / 10.0
    }

    /// Checks that every component is finite and physically meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidInput`] if a component is non-finite,
    /// the salinity is negative, or the pressure is negative.
    pub fn validate(&self) -> Result<(), PropertyError> {
        let finite = |name: &str, value: f64| {
            Finite::new(value)
                .map(|_| ())
                .map_err(|err| PropertyError::InvalidInput(format!("{name}: {err}")))
        };

        finite("salinity", self.salinity)?;
        finite("temperature", self.temperature_celsius())?;
        finite("pressure", self.pressure_dbar())?;

        if self.salinity < 0.0 {
            return Err(PropertyError::InvalidInput(format!(
                "salinity must not be negative, got {}",
                self.salinity
            )));
        }
        if self.pressure_dbar() < 0.0 {
            return Err(PropertyError::InvalidInput(format!(
                "pressure must not be negative, got {} dbar",
                self.pressure_dbar()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn pressure_converts_to_decibar() {
        let state = SeawaterState::new(
            35.0,
            ThermodynamicTemperature::new::<degree_celsius>(10.0),
            Pressure::new::<kilopascal>(1000.0),
        );
        assert_relative_eq!(state.pressure_dbar(), 100.0);
    }

    #[test]
    fn rejects_invalid_states() {
        assert!(SeawaterState::surface(34.7, 0.5).validate().is_ok());
        assert!(SeawaterState::surface(f64::NAN, 0.5).validate().is_err());
        assert!(SeawaterState::surface(-1.0, 0.5).validate().is_err());
        assert!(SeawaterState::surface(34.7, f64::INFINITY).validate().is_err());

        let below_surface = SeawaterState::surface(34.7, 0.5)
            .with_salinity(35.0)
            .with_temperature(ThermodynamicTemperature::new::<degree_celsius>(2.0));
        assert!(below_surface.validate().is_ok());
    }
}
