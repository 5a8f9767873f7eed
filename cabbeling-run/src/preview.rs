//! An engine that stops after initialization.
//!
//! `PreviewEngine` samples both tracers at cell centers, records a summary
//! of the initial state in the artifact, and reports the output schedule a
//! real engine would follow. It never advances time.

use std::collections::BTreeMap;

use cabbeling_setup::{
    SetupError,
    artifact::ArtifactError,
    domain::{DomainSpec, sample_field},
    engine::{Closure, SimulationEngine},
    grid::VerticalFaces,
    profile::{Tracer, TracerField},
    run::RunConfig,
};
use ndarray::Array3;
use serde::Serialize;
use thiserror::Error;
use uom::si::time::second;

/// Key of the initial-state entry written by [`PreviewEngine::run`].
pub const INITIAL_STATE_KEY: &str = "initial_state";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("tracer `{0}` was set before the grid")]
    MissingGrid(&'static str),

    #[error("tracer `{0}` was never set")]
    MissingTracer(&'static str),

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Range and mean of one sampled field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl FieldSummary {
    fn of(values: &Array3<f64>) -> Self {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        Self {
            min,
            max,
            mean: values.mean().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Serialize)]
struct InitialState<'a> {
    time: f64,
    faces: &'a [f64],
    fields: BTreeMap<Tracer, FieldSummary>,
}

#[derive(Debug)]
pub struct PreviewEngine {
    closure: Closure,
    domain: Option<DomainSpec>,
    faces: Vec<f64>,
    grid: Option<VerticalFaces>,
    fields: BTreeMap<Tracer, Array3<f64>>,
}

impl PreviewEngine {
    #[must_use]
    pub fn new(closure: Closure) -> Self {
        Self {
            closure,
            domain: None,
            faces: Vec::new(),
            grid: None,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the sampled field of `tracer`, if it has been set.
    #[must_use]
    pub fn field(&self, tracer: Tracer) -> Option<&Array3<f64>> {
        self.fields.get(&tracer)
    }
}

impl SimulationEngine for PreviewEngine {
    type Error = PreviewError;

    fn closure(&self) -> Closure {
        self.closure
    }

    fn set_grid(&mut self, domain: &DomainSpec, faces: &VerticalFaces) -> Result<(), PreviewError> {
        self.faces = faces.faces();
        self.domain = Some(*domain);
        self.grid = Some(*faces);

        let top = faces.cells();
        log::info!(
            "grid: {} x {} x {} cells, vertical spacing {:.3e} m at the bottom, {:.3e} m at the surface",
            domain.nx,
            domain.ny,
            top,
            self.faces[1] - self.faces[0],
            self.faces[top] - self.faces[top - 1],
        );
        Ok(())
    }

    fn set_tracer(&mut self, tracer: Tracer, field: &dyn TracerField) -> Result<(), PreviewError> {
        let (Some(domain), Some(grid)) = (&self.domain, &self.grid) else {
            return Err(PreviewError::MissingGrid(tracer.name()));
        };

        let values = sample_field(field, domain, grid)?;
        let summary = FieldSummary::of(&values);
        log::info!(
            "{}: min {:.6}, max {:.6}, mean {:.6}",
            tracer.name(),
            summary.min,
            summary.max,
            summary.mean
        );

        self.fields.insert(tracer, values);
        Ok(())
    }

    fn run(&mut self, config: &RunConfig) -> Result<(), PreviewError> {
        let fields = config
            .tracers
            .iter()
            .map(|tracer| {
                self.fields
                    .get(tracer)
                    .map(|values| (*tracer, FieldSummary::of(values)))
                    .ok_or(PreviewError::MissingTracer(tracer.name()))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let state = InitialState {
            time: 0.0,
            faces: &self.faces,
            fields,
        };
        config.artifact.append(INITIAL_STATE_KEY, &state)?;

        let stop = config.stop_time.get::<second>();
        let interval = config.snapshot_interval.get::<second>();
        log::info!(
            "a full run would write {:.0} snapshots to {} over {stop} s, starting from Δt = {:.1e} s",
            (stop / interval).floor(),
            config.artifact.path().display(),
            config.time_step.initial.get::<second>(),
        );
        log::warn!("preview engine does not time-step, stopping at t = 0");

        Ok(())
    }
}
