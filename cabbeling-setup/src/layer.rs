//! Layer condition model.
//!
//! An experiment is a warm or cold, fresh or salty upper layer sitting on a
//! fixed lower layer. The [`Regime`] tag names the kind of experiment and
//! decides where its output goes; the numbers live in
//! [`UpperLayerCondition`] and the derived [`TwoLayerParameters`].

use std::fmt;

use cabbeling_thermo::{EquationOfState, PropertyError, SeawaterState};
use serde::{Deserialize, Serialize};
use uom::si::f64::MassDensity;

use crate::error::{SetupError, finite};

/// The physical regime of the upper layer relative to the lower layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Lighter upper layer, no instability expected.
    Stable,
    /// Lighter upper layer whose mixtures with the lower layer are denser than both.
    Cabbeling,
    /// Denser upper layer, convectively unstable from the start.
    Unstable,
    /// Temperature contrast only; salinity matches the lower layer.
    Isohaline,
}

impl Regime {
    /// Every regime, in declaration order.
    pub const ALL: [Regime; 4] = [
        Regime::Stable,
        Regime::Cabbeling,
        Regime::Unstable,
        Regime::Isohaline,
    ];

    /// Returns the lowercase tag used for file names and config files.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Regime::Stable => "stable",
            Regime::Cabbeling => "cabbeling",
            Regime::Unstable => "unstable",
            Regime::Isohaline => "isohaline",
        }
    }

    /// Returns a short human-readable label for log output.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Regime::Stable => "stable two-layer stratification",
            Regime::Cabbeling => "stable stratification unstable to cabbeling",
            Regime::Unstable => "statically unstable two-layer stratification",
            Regime::Isohaline => "temperature-only stratification",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed lower layer every upper layer is compared against.
///
/// Passed explicitly to the components that need it rather than read from
/// global state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceLayer {
    /// Lower-layer salinity, in g/kg.
    pub salinity: f64,
    /// Lower-layer temperature, in °C.
    pub temperature: f64,
}

impl ReferenceLayer {
    /// Lower layer used by all cabbeling experiments: 34.7 g/kg and 0.5 °C.
    pub const STANDARD: ReferenceLayer = ReferenceLayer {
        salinity: 34.7,
        temperature: 0.5,
    };

    /// Returns the reference state at the surface, where the buoyancy
    /// coefficients for the non-dimensional numbers are evaluated.
    #[must_use]
    pub fn surface_state(&self) -> SeawaterState {
        SeawaterState::surface(self.salinity, self.temperature)
    }

    /// Validates that both reference values are finite.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] for a non-finite value.
    pub fn validate(&self) -> Result<(), SetupError> {
        finite("reference.salinity", self.salinity)?;
        finite("reference.temperature", self.temperature)?;
        Ok(())
    }
}

impl Default for ReferenceLayer {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Upper and lower values of one scalar quantity.
///
/// The difference is computed once, as `upper - lower`, and cannot be set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerPair {
    upper: f64,
    lower: f64,
    difference: f64,
}

impl LayerPair {
    /// Creates a pair from upper and lower values.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] if either value is non-finite.
    pub fn new(upper: f64, lower: f64) -> Result<Self, SetupError> {
        let upper = finite("upper", upper)?;
        let lower = finite("lower", lower)?;

        Ok(Self {
            upper,
            lower,
            difference: upper - lower,
        })
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns `upper - lower`.
    #[must_use]
    pub fn difference(&self) -> f64 {
        self.difference
    }

    /// Returns the value halfway between the two layers.
    #[must_use]
    pub fn midpoint(&self) -> f64 {
        self.lower + 0.5 * self.difference
    }
}

/// The upper-layer salinity and temperature for one regime.
///
/// `Isohaline` carries no salinity: its upper layer always takes the
/// reference salinity.
///
/// # Example
///
/// ```
/// use cabbeling_setup::layer::{ReferenceLayer, Regime, UpperLayerCondition};
///
/// let condition = UpperLayerCondition::new(Regime::Stable, 34.8, 1.0);
/// let params = condition.two_layer(&ReferenceLayer::STANDARD).unwrap();
///
/// assert_eq!(params.salinity().difference(), 34.8 - 34.7);
/// assert_eq!(params.temperature().difference(), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpperLayerCondition {
    Stable { salinity: f64, temperature: f64 },
    Cabbeling { salinity: f64, temperature: f64 },
    Unstable { salinity: f64, temperature: f64 },
    Isohaline { temperature: f64 },
}

impl UpperLayerCondition {
    /// Creates the condition for `regime`.
    ///
    /// For [`Regime::Isohaline`] the `salinity` argument is discarded.
    #[must_use]
    pub fn new(regime: Regime, salinity: f64, temperature: f64) -> Self {
        match regime {
            Regime::Stable => Self::Stable {
                salinity,
                temperature,
            },
            Regime::Cabbeling => Self::Cabbeling {
                salinity,
                temperature,
            },
            Regime::Unstable => Self::Unstable {
                salinity,
                temperature,
            },
            Regime::Isohaline => Self::Isohaline { temperature },
        }
    }

    /// Returns the regime tag of this condition.
    #[must_use]
    pub fn regime(&self) -> Regime {
        match self {
            Self::Stable { .. } => Regime::Stable,
            Self::Cabbeling { .. } => Regime::Cabbeling,
            Self::Unstable { .. } => Regime::Unstable,
            Self::Isohaline { .. } => Regime::Isohaline,
        }
    }

    /// Returns the upper-layer `(salinity, temperature)`, resolving the
    /// isohaline salinity from `reference`.
    #[must_use]
    pub fn upper(&self, reference: &ReferenceLayer) -> (f64, f64) {
        match *self {
            Self::Stable {
                salinity,
                temperature,
            }
            | Self::Cabbeling {
                salinity,
                temperature,
            }
            | Self::Unstable {
                salinity,
                temperature,
            } => (salinity, temperature),
            Self::Isohaline { temperature } => (reference.salinity, temperature),
        }
    }

    /// Derives the two-layer parameters against `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] if any upper or reference
    /// value is non-finite.
    pub fn two_layer(&self, reference: &ReferenceLayer) -> Result<TwoLayerParameters, SetupError> {
        let (salinity, temperature) = self.upper(reference);

        let salinity = LayerPair::new(salinity, reference.salinity)
            .map_err(|err| rename(err, "upper salinity", "reference salinity"))?;
        let temperature = LayerPair::new(temperature, reference.temperature)
            .map_err(|err| rename(err, "upper temperature", "reference temperature"))?;

        let params = TwoLayerParameters {
            regime: self.regime(),
            salinity,
            temperature,
        };
        log::debug!(
            "{} layers: ΔS = {}, ΔT = {}",
            params.regime,
            params.salinity.difference,
            params.temperature.difference
        );

        Ok(params)
    }
}

/// Replaces the generic `upper`/`lower` names from [`LayerPair::new`].
fn rename(err: SetupError, upper: &'static str, lower: &'static str) -> SetupError {
    match err {
        SetupError::InvalidParameter { name, reason } => SetupError::InvalidParameter {
            name: if name == "upper" { upper } else { lower },
            reason,
        },
        other => other,
    }
}

/// Salinity and temperature of both layers for one experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoLayerParameters {
    regime: Regime,
    salinity: LayerPair,
    temperature: LayerPair,
}

impl TwoLayerParameters {
    #[must_use]
    pub fn regime(&self) -> Regime {
        self.regime
    }

    #[must_use]
    pub fn salinity(&self) -> &LayerPair {
        &self.salinity
    }

    #[must_use]
    pub fn temperature(&self) -> &LayerPair {
        &self.temperature
    }

    /// Returns the surface density difference `ρ_upper − ρ_lower`.
    ///
    /// Negative for a statically stable configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] if the equation of state fails for either layer.
    pub fn density_contrast<E: EquationOfState>(&self, eos: &E) -> Result<MassDensity, PropertyError> {
        let upper = eos.density(&SeawaterState::surface(
            self.salinity.upper,
            self.temperature.upper,
        ))?;
        let lower = eos.density(&SeawaterState::surface(
            self.salinity.lower,
            self.temperature.lower,
        ))?;
        Ok(upper - lower)
    }
}
