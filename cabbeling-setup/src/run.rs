//! Run assembly and hand-off to a simulation engine.

use std::path::PathBuf;

use cabbeling_thermo::{EquationOfState, SeawaterState};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Time, time::second};

use crate::{
    artifact::{Artifact, ArtifactError, ArtifactFormat, NON_DIMENSIONAL_KEY},
    config::ExperimentConfig,
    domain::DomainSpec,
    engine::{Closure, SimulationEngine},
    error::{RunError, SetupError, positive},
    grid::VerticalFaces,
    layer::{Regime, TwoLayerParameters},
    nondim::{self, NonDimensionalInput, NonDimensionalReport},
    profile::{Interface, Perturbation, Tracer, TracerProfile},
};

/// Adaptive time-step control handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStepPolicy {
    /// First time step.
    pub initial: Time,
    /// Upper bound on the time step.
    pub max: Time,
    /// Largest factor by which one adjustment may grow the step.
    pub max_change: f64,
    /// Advective CFL target.
    pub cfl: f64,
    /// Diffusive CFL target.
    pub diffusive_cfl: f64,
    /// Iterations between step recalculations.
    pub update_interval: usize,
}

impl Default for TimeStepPolicy {
    fn default() -> Self {
        Self {
            initial: Time::new::<second>(1e-4),
            max: Time::new::<second>(0.1),
            max_change: 1.2,
            cfl: 0.75,
            diffusive_cfl: 0.75,
            update_interval: 10,
        }
    }
}

impl TimeStepPolicy {
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] if a value is non-positive,
    /// the initial step exceeds the maximum, or `max_change` does not exceed one.
    pub fn validate(&self) -> Result<(), SetupError> {
        let initial = positive("time_step.initial", self.initial.get::<second>())?;
        let max = positive("time_step.max", self.max.get::<second>())?;
        if initial > max {
            return Err(SetupError::invalid(
                "time_step.initial",
                format!("{initial} s exceeds the maximum of {max} s"),
            ));
        }

        if positive("time_step.max_change", self.max_change)? <= 1.0 {
            return Err(SetupError::invalid("time_step.max_change", "must exceed one"));
        }
        positive("time_step.cfl", self.cfl)?;
        positive("time_step.diffusive_cfl", self.diffusive_cfl)?;

        if self.update_interval == 0 {
            return Err(SetupError::invalid("time_step.update_interval", "must be at least one"));
        }
        Ok(())
    }
}

/// Where a run's artifact goes, in which container, and how often
/// snapshots are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub format: ArtifactFormat,
    pub snapshot_interval: Time,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("simulation_output"),
            format: ArtifactFormat::default(),
            snapshot_interval: Time::new::<second>(1.0),
        }
    }
}

impl OutputConfig {
    /// Returns `<directory>/<regime>.<extension>`, with the extension set by
    /// the artifact format.
    ///
    /// ```
    /// use std::path::Path;
    /// use cabbeling_setup::{artifact::ArtifactFormat, layer::Regime, run::OutputConfig};
    ///
    /// let output = OutputConfig {
    ///     format: ArtifactFormat::Jld2,
    ///     ..OutputConfig::default()
    /// };
    /// assert_eq!(
    ///     output.path_for(Regime::Stable),
    ///     Path::new("simulation_output/stable.jld2"),
    /// );
    /// ```
    #[must_use]
    pub fn path_for(&self, regime: Regime) -> PathBuf {
        self.directory
            .join(regime.name())
            .with_extension(self.format.extension())
    }

    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] for a format this build
    /// cannot write or a non-positive snapshot interval.
    pub fn validate(&self) -> Result<(), SetupError> {
        if !self.format.is_available() {
            return Err(SetupError::invalid(
                "output.format",
                format!("`{}` output needs the `hdf5` feature", self.format),
            ));
        }
        positive(
            "output.snapshot_interval",
            self.snapshot_interval.get::<second>(),
        )?;
        Ok(())
    }
}

/// Run length and progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub stop_time: Time,
    /// Iterations between progress reports.
    pub progress_interval: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            stop_time: Time::new::<second>(600.0),
            progress_interval: 100,
        }
    }
}

impl RunSettings {
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] for a non-positive stop time
    /// or a zero progress interval.
    pub fn validate(&self) -> Result<(), SetupError> {
        positive("run.stop_time", self.stop_time.get::<second>())?;
        if self.progress_interval == 0 {
            return Err(SetupError::invalid("run.progress_interval", "must be at least one"));
        }
        Ok(())
    }
}

/// Everything the engine needs to integrate and write output.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Already holds the non-dimensional numbers; snapshots are appended.
    pub artifact: Artifact,
    pub time_step: TimeStepPolicy,
    pub snapshot_interval: Time,
    /// Fields included in each snapshot.
    pub tracers: Vec<Tracer>,
    pub stop_time: Time,
    pub progress_interval: usize,
}

/// A fully prepared two-layer experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    params: TwoLayerParameters,
    /// Lower reference layer at the surface, where `α` and `β` are evaluated.
    reference_state: SeawaterState,
    domain: DomainSpec,
    faces: VerticalFaces,
    salinity: TracerProfile,
    temperature: TracerProfile,
    time_step: TimeStepPolicy,
    output: OutputConfig,
    settings: RunSettings,
}

impl Experiment {
    /// Prepares an experiment from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`SetupError`] if any section fails validation or the
    /// vertical grid cannot be generated.
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let params = config.condition.upper().two_layer(&config.reference)?;
        let faces = config.domain.vertical_faces(config.grid)?;

        let interface = Interface::new(config.interface.location, config.interface.thickness)?;
        let perturbation = config
            .perturbation
            .enabled
            .then(|| Perturbation::new(config.perturbation.width))
            .transpose()?;

        log::info!(
            "prepared {} experiment ({})",
            params.regime(),
            params.regime().describe()
        );

        Ok(Self {
            params,
            reference_state: config.reference.surface_state(),
            domain: config.domain,
            faces,
            salinity: TracerProfile::salinity(&params, interface, perturbation),
            temperature: TracerProfile::temperature(&params, interface),
            time_step: config.time_step,
            output: config.output.clone(),
            settings: config.run,
        })
    }

    #[must_use]
    pub fn regime(&self) -> Regime {
        self.params.regime()
    }

    #[must_use]
    pub fn parameters(&self) -> &TwoLayerParameters {
        &self.params
    }

    #[must_use]
    pub fn faces(&self) -> &VerticalFaces {
        &self.faces
    }

    /// Returns the initializer for `tracer`.
    #[must_use]
    pub fn profile(&self, tracer: Tracer) -> &TracerProfile {
        match tracer {
            Tracer::Salinity => &self.salinity,
            Tracer::Temperature => &self.temperature,
        }
    }

    /// Assembles the configuration handed to [`SimulationEngine::run`].
    #[must_use]
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            artifact: Artifact::new(self.output.path_for(self.regime()), self.output.format),
            time_step: self.time_step,
            snapshot_interval: self.output.snapshot_interval,
            tracers: Tracer::ALL.to_vec(),
            stop_time: self.settings.stop_time,
            progress_interval: self.settings.progress_interval,
        }
    }

    /// Computes the non-dimensional numbers for `closure`.
    ///
    /// `α` and `β` come from `eos` at the lower reference state at the
    /// surface. Without a salinity contrast `Ra_ρ` is undefined and omitted.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Property`] if `eos` fails, or [`RunError::Setup`]
    /// if a ratio is degenerate.
    pub fn non_dimensional_report<E: EquationOfState>(
        &self,
        closure: &Closure,
        eos: &E,
    ) -> Result<NonDimensionalReport, RunError> {
        if self.params.salinity().difference() == 0.0 {
            log::warn!(
                "{} experiment has no salinity contrast, omitting the density ratio",
                self.regime()
            );
            return Ok(nondim::compute_diffusive(closure)?);
        }

        let alpha = eos.thermal_expansion(&self.reference_state)?;
        let beta = eos.haline_contraction(&self.reference_state)?;

        Ok(nondim::compute(&NonDimensionalInput::new(
            *closure,
            alpha,
            beta,
            &self.params,
        ))?)
    }

    /// Initializes `engine`, records the non-dimensional numbers, and runs.
    ///
    /// The artifact is created fresh, replacing any earlier run of the same
    /// regime, and receives the report before the engine starts. If that
    /// write fails the engine is never run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Engine`] for any engine failure, the errors of
    /// [`Experiment::non_dimensional_report`], or [`RunError::Artifact`] if
    /// the artifact cannot be created or written.
    pub fn launch<S, E>(&self, engine: &mut S, eos: &E) -> Result<NonDimensionalReport, RunError>
    where
        S: SimulationEngine,
        E: EquationOfState,
    {
        engine.set_grid(&self.domain, &self.faces).map_err(engine_error)?;
        for tracer in Tracer::ALL {
            engine.set_tracer(tracer, self.profile(tracer)).map_err(engine_error)?;
        }

        let report = self.non_dimensional_report(&engine.closure(), eos)?;
        let config = self.run_config();

        std::fs::create_dir_all(&self.output.directory).map_err(|source| {
            ArtifactError::Io {
                path: self.output.directory.clone(),
                source,
            }
        })?;
        let artifact = Artifact::create(config.artifact.path(), self.output.format)?;
        artifact.append(NON_DIMENSIONAL_KEY, &report)?;
        log::info!(
            "wrote non-dimensional numbers to {}",
            artifact.path().display()
        );

        engine.run(&config).map_err(engine_error)?;
        log::info!("{} run finished", self.regime());

        Ok(report)
    }
}

fn engine_error<E>(err: E) -> RunError
where
    E: std::error::Error + Send + Sync + 'static,
{
    RunError::Engine(Box::new(err))
}
