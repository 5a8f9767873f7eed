//! Layer transition profiles.
//!
//! A profile blends the lower-layer value into the upper-layer value with a
//! hyperbolic tangent centered on the interface:
//!
//! ```text
//! value(z) = (Δ/2)·tanh(thickness·(z + location)) + (lower + Δ/2)
//! ```
//!
//! Salinity may carry an extra one-sided Gaussian bump above the interface
//! to seed the instability. Temperature never does.
//!
//! Every profile is a pure function of the sample point, so engines may
//! evaluate it in any order or in parallel.

use std::f64::consts::PI;

use cabbeling_core::Model;
use serde::Serialize;

use crate::{
    error::{SetupError, finite, positive},
    layer::{LayerPair, TwoLayerParameters},
};

/// A tracer field initialized from a two-layer profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Tracer {
    #[serde(rename = "S")]
    Salinity,
    #[serde(rename = "T")]
    Temperature,
}

impl Tracer {
    /// Both tracers, in the order engines register them.
    pub const ALL: [Tracer; 2] = [Tracer::Salinity, Tracer::Temperature];

    /// Returns the engine-side field name, `"S"` or `"T"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tracer::Salinity => "S",
            Tracer::Temperature => "T",
        }
    }
}

/// A point in the simulation domain, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Location and sharpness of the layer interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interface {
    location: f64,
    thickness: f64,
}

impl Interface {
    /// Creates an interface centered at `z = -location`.
    ///
    /// `thickness` is an inverse length: larger values give a sharper
    /// transition.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] if `location` is non-finite
    /// or `thickness` is not finite and positive.
    pub fn new(location: f64, thickness: f64) -> Result<Self, SetupError> {
        Ok(Self {
            location: finite("interface.location", location)?,
            thickness: positive("interface.thickness", thickness)?,
        })
    }
}

/// A one-sided Gaussian bump added to salinity above the interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    width: f64,
}

impl Perturbation {
    /// Creates a perturbation of the given width.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] if `width` is not finite and positive.
    pub fn new(width: f64) -> Result<Self, SetupError> {
        Ok(Self {
            width: positive("perturbation.width", width)?,
        })
    }

    /// Returns the perturbation at height `z` for the given interface.
    ///
    /// Zero at and below the interface.
    #[must_use]
    pub fn at(&self, z: f64, interface: &Interface) -> f64 {
        let location = interface.location;
        if z <= -location {
            return 0.0;
        }

        let dz = z + location;
        let w2 = self.width * self.width;
        (-(dz - location / 2.0).powi(2) / (2.0 * w2)).exp() / (2.0 * PI * w2).sqrt()
    }
}

/// Evaluates the layer transition at height `z`.
///
/// # Errors
///
/// Returns [`SetupError::InvalidCoordinate`] if `z` is NaN or infinite.
///
/// # Example
///
/// ```
/// use cabbeling_setup::{
///     layer::LayerPair,
///     profile::{Interface, profile},
/// };
///
/// let salinity = LayerPair::new(34.6, 34.7).unwrap();
/// let interface = Interface::new(0.5, 100.0).unwrap();
///
/// let at_interface = profile(-0.5, &salinity, &interface, None).unwrap();
/// assert!((at_interface - 34.65).abs() < 1e-12);
/// ```
pub fn profile(
    z: f64,
    pair: &LayerPair,
    interface: &Interface,
    perturbation: Option<&Perturbation>,
) -> Result<f64, SetupError> {
    if !z.is_finite() {
        return Err(SetupError::InvalidCoordinate { axis: 'z', value: z });
    }

    let half = 0.5 * pair.difference();
    let base = half * (interface.thickness * (z + interface.location)).tanh() + (pair.lower() + half);

    Ok(base + perturbation.map_or(0.0, |p| p.at(z, interface)))
}

/// The initial field of one tracer.
///
/// Implements [`Model`] with a [`Point`] input, matching the `(x, y, z) -> value`
/// signature engines use for pointwise tracer assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerProfile {
    tracer: Tracer,
    pair: LayerPair,
    interface: Interface,
    perturbation: Option<Perturbation>,
}

impl TracerProfile {
    /// The salinity profile, optionally perturbed above the interface.
    #[must_use]
    pub fn salinity(
        params: &TwoLayerParameters,
        interface: Interface,
        perturbation: Option<Perturbation>,
    ) -> Self {
        Self {
            tracer: Tracer::Salinity,
            pair: *params.salinity(),
            interface,
            perturbation,
        }
    }

    /// The temperature profile, which is never perturbed.
    #[must_use]
    pub fn temperature(params: &TwoLayerParameters, interface: Interface) -> Self {
        Self {
            tracer: Tracer::Temperature,
            pair: *params.temperature(),
            interface,
            perturbation: None,
        }
    }

    #[must_use]
    pub fn tracer(&self) -> Tracer {
        self.tracer
    }

    #[must_use]
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    #[must_use]
    pub fn perturbation(&self) -> Option<&Perturbation> {
        self.perturbation.as_ref()
    }

    /// Evaluates the profile at height `z`.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidCoordinate`] if `z` is non-finite.
    pub fn at_height(&self, z: f64) -> Result<f64, SetupError> {
        profile(z, &self.pair, &self.interface, self.perturbation.as_ref())
    }
}

impl Model for TracerProfile {
    type Input = Point;
    type Output = f64;
    type Error = SetupError;

    /// Evaluates the profile at `point`; the value depends only on `z`.
    fn call(&self, point: &Point) -> Result<f64, SetupError> {
        for (axis, value) in [('x', point.x), ('y', point.y)] {
            if !value.is_finite() {
                return Err(SetupError::InvalidCoordinate { axis, value });
            }
        }
        self.at_height(point.z)
    }
}

/// A pointwise tracer initializer, as consumed by a simulation engine.
pub trait TracerField: Model<Input = Point, Output = f64, Error = SetupError> + Sync {}

impl<M> TracerField for M where M: Model<Input = Point, Output = f64, Error = SetupError> + Sync {}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::layer::{ReferenceLayer, Regime, UpperLayerCondition};

    fn params(regime: Regime, s: f64, t: f64) -> TwoLayerParameters {
        UpperLayerCondition::new(regime, s, t)
            .two_layer(&ReferenceLayer::STANDARD)
            .unwrap()
    }

    #[allow(clippy::cast_precision_loss)]
    fn heights(n: usize) -> impl Iterator<Item = f64> {
        (0..=n).map(move |i| -1.0 + i as f64 / n as f64)
    }

    #[test]
    fn interface_center_is_the_midpoint() -> Result<(), SetupError> {
        let params = params(Regime::Cabbeling, 34.6, -1.5);
        let interface = Interface::new(0.5, 100.0)?;

        let salinity = TracerProfile::salinity(&params, interface, None);
        let temperature = TracerProfile::temperature(&params, interface);

        assert_relative_eq!(salinity.at_height(-0.5)?, (34.6 + 34.7) / 2.0, epsilon = 1e-12);
        assert_relative_eq!(temperature.at_height(-0.5)?, (-1.5 + 0.5) / 2.0, epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn approaches_layer_values_away_from_interface() -> Result<(), SetupError> {
        let params = params(Regime::Stable, 34.8, 1.0);
        let interface = Interface::new(0.5, 100.0)?;
        let salinity = TracerProfile::salinity(&params, interface, None);

        assert_relative_eq!(salinity.at_height(0.0)?, 34.8, epsilon = 1e-12);
        assert_relative_eq!(salinity.at_height(-1.0)?, 34.7, epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn monotonic_and_bounded_without_perturbation() -> Result<(), SetupError> {
        let interface = Interface::new(0.5, 8.0)?;

        for (regime, s, t) in [(Regime::Stable, 34.8, 1.0), (Regime::Cabbeling, 34.6, -1.5)] {
            let params = params(regime, s, t);
            for profile in [
                TracerProfile::salinity(&params, interface, None),
                TracerProfile::temperature(&params, interface),
            ] {
                let pair = profile.pair;
                let (lo, hi) = if pair.difference() > 0.0 {
                    (pair.lower(), pair.upper())
                } else {
                    (pair.upper(), pair.lower())
                };

                let values = heights(200)
                    .map(|z| profile.at_height(z))
                    .collect::<Result<Vec<_>, _>>()?;

                assert!(values.iter().all(|v| (lo - 1e-12..=hi + 1e-12).contains(v)));
                let increasing = pair.difference() > 0.0;
                assert!(values.windows(2).all(|w| if increasing {
                    w[1] >= w[0]
                } else {
                    w[1] <= w[0]
                }));
            }
        }
        Ok(())
    }

    #[test]
    fn sharp_interface_approaches_a_step() -> Result<(), SetupError> {
        let pair = LayerPair::new(34.8, 34.7)?;
        let interface = Interface::new(0.5, 1e6)?;

        assert_relative_eq!(profile(-0.5 + 1e-3, &pair, &interface, None)?, 34.8, epsilon = 1e-12);
        assert_relative_eq!(profile(-0.5 - 1e-3, &pair, &interface, None)?, 34.7, epsilon = 1e-12);

        Ok(())
    }

    #[test]
    fn perturbation_is_one_sided() -> Result<(), SetupError> {
        let interface = Interface::new(0.5, 100.0)?;

        for width in [0.01, 0.05, 0.5] {
            let bump = Perturbation::new(width)?;

            assert!(heights(100).filter(|z| *z <= -0.5).all(|z| bump.at(z, &interface) == 0.0));
            assert_eq!(bump.at(-0.5, &interface), 0.0);

            // Peak sits half an interface depth above the interface.
            let peak = bump.at(-0.25, &interface);
            assert!(peak > 0.0);
            assert_relative_eq!(peak, 1.0 / (2.0 * PI * width * width).sqrt(), epsilon = 1e-12);
        }

        Ok(())
    }

    #[test]
    fn temperature_is_never_perturbed() -> Result<(), SetupError> {
        let params = params(Regime::Cabbeling, 34.6, -1.5);
        let interface = Interface::new(0.5, 100.0)?;
        let bump = Perturbation::new(0.05)?;

        let perturbed = TracerProfile::salinity(&params, interface, Some(bump));
        let plain = TracerProfile::salinity(&params, interface, None);
        let temperature = TracerProfile::temperature(&params, interface);

        assert!(temperature.perturbation().is_none());
        assert!(perturbed.at_height(-0.25)? > plain.at_height(-0.25)?);
        assert_eq!(perturbed.at_height(-0.75)?, plain.at_height(-0.75)?);

        Ok(())
    }

    #[test]
    fn non_finite_coordinates_are_rejected() -> Result<(), SetupError> {
        let params = params(Regime::Stable, 34.8, 1.0);
        let profile = TracerProfile::salinity(&params, Interface::new(0.5, 100.0)?, None);

        assert!(matches!(
            profile.call(&Point::new(f64::NAN, 0.0, -0.5)),
            Err(SetupError::InvalidCoordinate { axis: 'x', .. })
        ));
        assert!(matches!(
            profile.call(&Point::new(0.0, f64::INFINITY, -0.5)),
            Err(SetupError::InvalidCoordinate { axis: 'y', .. })
        ));
        assert!(matches!(
            profile.call(&Point::new(0.0, 0.0, f64::NEG_INFINITY)),
            Err(SetupError::InvalidCoordinate { axis: 'z', .. })
        ));
        assert_eq!(profile.call(&Point::new(0.05, 0.05, -0.5))?, profile.at_height(-0.5)?);

        Ok(())
    }

    #[test]
    fn invalid_geometry_is_rejected() {
        assert!(Interface::new(f64::NAN, 100.0).is_err());
        assert!(Interface::new(0.5, 0.0).is_err());
        assert!(Interface::new(0.5, -1.0).is_err());
        assert!(Perturbation::new(0.0).is_err());
        assert!(Perturbation::new(f64::INFINITY).is_err());
    }
}
