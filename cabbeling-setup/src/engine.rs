//! The boundary to an external simulation engine.
//!
//! This crate never time-steps. It hands a grid, two tracer initializers,
//! and a [`RunConfig`] to whatever implements [`SimulationEngine`].

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use uom::si::{f64::KinematicViscosity, kinematic_viscosity::square_meter_per_second};

use crate::{
    domain::DomainSpec,
    error::{SetupError, positive},
    grid::VerticalFaces,
    profile::{Tracer, TracerField},
    run::RunConfig,
};

/// A molecular diffusivity, in m²/s.
///
/// Shares its dimension with kinematic viscosity.
pub type Diffusivity = KinematicViscosity;

/// Molecular viscosity and tracer diffusivities of the fluid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Closure {
    /// Kinematic viscosity `ν`.
    pub viscosity: KinematicViscosity,
    /// Salt diffusivity `κ_S`.
    pub salinity_diffusivity: Diffusivity,
    /// Heat diffusivity `κ_T`.
    pub temperature_diffusivity: Diffusivity,
}

impl Default for Closure {
    fn default() -> Self {
        Self {
            viscosity: m2_per_s(1e-6),
            salinity_diffusivity: m2_per_s(1e-9),
            temperature_diffusivity: m2_per_s(1e-7),
        }
    }
}

impl Closure {
    /// Returns the diffusivity of `tracer`.
    #[must_use]
    pub fn diffusivity(&self, tracer: Tracer) -> Diffusivity {
        match tracer {
            Tracer::Salinity => self.salinity_diffusivity,
            Tracer::Temperature => self.temperature_diffusivity,
        }
    }

    /// Validates that all coefficients are finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] naming the offending field.
    pub fn validate(&self) -> Result<(), SetupError> {
        positive("closure.viscosity", self.viscosity.get::<square_meter_per_second>())?;
        positive(
            "closure.salinity_diffusivity",
            self.salinity_diffusivity.get::<square_meter_per_second>(),
        )?;
        positive(
            "closure.temperature_diffusivity",
            self.temperature_diffusivity.get::<square_meter_per_second>(),
        )?;
        Ok(())
    }
}

fn m2_per_s(value: f64) -> KinematicViscosity {
    KinematicViscosity::new::<square_meter_per_second>(value)
}

/// A time-stepping engine that can be initialized from this crate.
///
/// Calls arrive in a fixed order: [`set_grid`](Self::set_grid), then
/// [`set_tracer`](Self::set_tracer) once per tracer, then
/// [`run`](Self::run). An error from any call aborts the launch.
pub trait SimulationEngine {
    type Error: StdError + Send + Sync + 'static;

    /// Returns the closure the engine integrates with.
    fn closure(&self) -> Closure;

    /// Builds the grid from the horizontal extents and the vertical face function.
    ///
    /// # Errors
    ///
    /// Returns an engine-specific error if the grid cannot be built.
    fn set_grid(&mut self, domain: &DomainSpec, faces: &VerticalFaces) -> Result<(), Self::Error>;

    /// Assigns the initial field of `tracer` pointwise.
    ///
    /// # Errors
    ///
    /// Returns an engine-specific error, including failures of `field` itself.
    fn set_tracer(&mut self, tracer: Tracer, field: &dyn TracerField) -> Result<(), Self::Error>;

    /// Integrates to the stop time, writing output on the configured schedule.
    ///
    /// # Errors
    ///
    /// Returns an engine-specific error if the run fails.
    fn run(&mut self, config: &RunConfig) -> Result<(), Self::Error>;
}
