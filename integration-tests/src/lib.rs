//! Shared fixtures for the cross-crate tests.

use std::collections::BTreeMap;

use cabbeling_setup::{
    SetupError,
    domain::{DomainSpec, sample_field},
    engine::{Closure, SimulationEngine},
    grid::VerticalFaces,
    profile::{Tracer, TracerField},
    run::RunConfig,
};

/// An engine that samples tracers on its grid and records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub closure: Closure,
    pub calls: Vec<String>,
    pub faces: Vec<f64>,
    pub fields: BTreeMap<Tracer, Vec<f64>>,
    pub run_config: Option<RunConfig>,
    grid: Option<(DomainSpec, VerticalFaces)>,
}

impl SimulationEngine for RecordingEngine {
    type Error = SetupError;

    fn closure(&self) -> Closure {
        self.closure
    }

    fn set_grid(&mut self, domain: &DomainSpec, faces: &VerticalFaces) -> Result<(), SetupError> {
        self.calls.push("set_grid".to_owned());
        self.faces = faces.faces();
        self.grid = Some((*domain, *faces));
        Ok(())
    }

    fn set_tracer(&mut self, tracer: Tracer, field: &dyn TracerField) -> Result<(), SetupError> {
        self.calls.push(format!("set_tracer {}", tracer.name()));
        let (domain, faces) = self
            .grid
            .as_ref()
            .ok_or_else(|| SetupError::InvalidParameter {
                name: "grid",
                reason: "set_tracer called before set_grid".to_owned(),
            })?;

        let values = sample_field(field, domain, faces)?;
        self.fields.insert(tracer, values.iter().copied().collect());
        Ok(())
    }

    fn run(&mut self, config: &RunConfig) -> Result<(), SetupError> {
        self.calls.push("run".to_owned());
        self.run_config = Some(config.clone());
        Ok(())
    }
}
