//! UNESCO EOS-80 equation of state for seawater.
//!
//! Reference: UNESCO (1981), Tenth report of the joint panel on oceanographic
//! tables and standards; Millero & Poisson (1981).
//!
//! Inputs are practical salinity, temperature in °C, and gauge pressure; the
//! high-pressure correction uses the secant bulk modulus with pressure in bar.

use uom::si::{f64::MassDensity, mass_density::kilogram_per_cubic_meter};

use crate::{PropertyError, SeawaterState};

use super::EquationOfState;

/// The UNESCO EOS-80 polynomial equation of state.
///
/// # Example
///
/// ```
/// use cabbeling_thermo::{EquationOfState, SeawaterState, model::eos80::Eos80};
/// use uom::si::mass_density::kilogram_per_cubic_meter;
///
/// let rho = Eos80.density(&SeawaterState::surface(35.0, 5.0)).unwrap();
/// assert!((rho.get::<kilogram_per_cubic_meter>() - 1027.675).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eos80;

impl Eos80 {
    /// One-atmosphere density `ρ(S, T, 0)` in kg/m³.
    fn surface_density(s: f64, t: f64) -> f64 {
        // Standard mean ocean water.
        let rho_w = 999.842_594 + 6.793_952e-2 * t - 9.095_290e-3 * t.powi(2)
            + 1.001_685e-4 * t.powi(3)
            - 1.120_083e-6 * t.powi(4)
            + 6.536_336e-9 * t.powi(5);

        let a = 8.244_93e-1 - 4.0899e-3 * t + 7.6438e-5 * t.powi(2) - 8.2467e-7 * t.powi(3)
            + 5.3875e-9 * t.powi(4);
        let b = -5.724_66e-3 + 1.0227e-4 * t - 1.6546e-6 * t.powi(2);
        let c = 4.8314e-4;

        rho_w + a * s + b * s.powf(1.5) + c * s.powi(2)
    }

    /// Secant bulk modulus `K(S, T, p)` in bar, with `p` in bar.
    fn secant_bulk_modulus(s: f64, t: f64, p: f64) -> f64 {
        let k_w = 19_652.21 + 148.4206 * t - 2.327_105 * t.powi(2) + 1.360_477e-2 * t.powi(3)
            - 5.155_288e-5 * t.powi(4);

        let k_0 = k_w
            + s * (54.6746 - 0.603_459 * t + 1.099_87e-2 * t.powi(2) - 6.1670e-5 * t.powi(3))
            + s.powf(1.5) * (7.944e-2 + 1.6483e-2 * t - 5.3009e-4 * t.powi(2));

        let a_w = 3.239_908 + 1.437_13e-3 * t + 1.160_92e-4 * t.powi(2) - 5.779_05e-7 * t.powi(3);
        let a = a_w
            + s * (2.2838e-3 - 1.0981e-5 * t - 1.6078e-6 * t.powi(2))
            + s.powf(1.5) * 1.910_75e-4;

        let b_w = 8.509_35e-5 - 6.122_93e-6 * t + 5.2787e-8 * t.powi(2);
        let b = b_w + s * (-9.9348e-7 + 2.0816e-8 * t + 9.1697e-10 * t.powi(2));

        k_0 + p * (a + b * p)
    }
}

impl EquationOfState for Eos80 {
    fn density(&self, state: &SeawaterState) -> Result<MassDensity, PropertyError> {
        state.validate()?;

        let s = state.salinity;
        let t = state.temperature_celsius();
        let p_bar = state.pressure_dbar() / 10.0;

        let rho_0 = Self::surface_density(s, t);
        let rho = if p_bar == 0.0 {
            rho_0
        } else {
            let k = Self::secant_bulk_modulus(s, t, p_bar);
            let compression = 1.0 - p_bar / k;
            if compression <= 0.0 {
                return Err(PropertyError::Calculation(format!(
                    "pressure {p_bar} bar exceeds the secant bulk modulus {k} bar"
                )));
            }
            rho_0 / compression
        };

        if rho.is_finite() && rho > 0.0 {
            Ok(MassDensity::new::<kilogram_per_cubic_meter>(rho))
        } else {
            Err(PropertyError::Calculation(format!(
                "density must be positive and finite, got {rho}"
            )))
        }
    }
}
