//! TOML experiment configuration.
//!
//! Every section is optional. Missing sections and fields take the values of
//! the reference cabbeling experiment. Dimensional quantities are given in SI
//! base units: meters, seconds, and m²/s.
//!
//! ```toml
//! [condition]
//! regime = "stable"
//! salinity = 34.8
//! temperature = 1.0
//!
//! [domain]
//! lz = 1.0
//! nz = 4
//!
//! [grid]
//! refinement = 1.2
//! stretching = 100.0
//! ```

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::DomainSpec,
    engine::Closure,
    error::{SetupError, finite, positive},
    grid::GridStretch,
    layer::{ReferenceLayer, Regime, UpperLayerCondition},
    run::{OutputConfig, RunSettings, TimeStepPolicy},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed experiment configuration")]
    Parse(#[from] toml::de::Error),

    #[error("invalid experiment configuration")]
    Invalid(#[from] SetupError),
}

/// The upper-layer condition as written in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionConfig {
    pub regime: Regime,
    /// Upper-layer salinity, in g/kg. Ignored for `isohaline`.
    pub salinity: f64,
    /// Upper-layer temperature, in °C.
    pub temperature: f64,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            regime: Regime::Cabbeling,
            salinity: 34.6,
            temperature: -1.5,
        }
    }
}

impl ConditionConfig {
    #[must_use]
    pub fn upper(&self) -> UpperLayerCondition {
        UpperLayerCondition::new(self.regime, self.salinity, self.temperature)
    }

    /// # Errors
    ///
    /// Returns [`SetupError::InvalidParameter`] for a non-finite value the
    /// regime actually uses.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.regime != Regime::Isohaline {
            finite("condition.salinity", self.salinity)?;
        }
        finite("condition.temperature", self.temperature)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Depth of the interface below the surface, in meters.
    pub location: f64,
    /// Inverse transition width, in 1/m.
    pub thickness: f64,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            location: 0.5,
            thickness: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerturbationConfig {
    pub enabled: bool,
    /// Gaussian width, in meters.
    pub width: f64,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 0.05,
        }
    }
}

/// A complete experiment description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub condition: ConditionConfig,
    pub reference: ReferenceLayer,
    pub domain: DomainSpec,
    pub grid: GridStretch,
    pub interface: InterfaceConfig,
    pub perturbation: PerturbationConfig,
    pub closure: Closure,
    pub time_step: TimeStepPolicy,
    pub output: OutputConfig,
    pub run: RunSettings,
}

impl ExperimentConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown value
    /// types, and [`ConfigError::Invalid`] if validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// see [`ExperimentConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;

        log::debug!("loaded {} experiment from {}", config.condition.regime, path.display());
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`SetupError`] found.
    pub fn validate(&self) -> Result<(), SetupError> {
        self.condition.validate()?;
        self.reference.validate()?;
        self.domain.validate()?;
        self.grid.validate()?;

        finite("interface.location", self.interface.location)?;
        positive("interface.thickness", self.interface.thickness)?;
        if self.perturbation.enabled {
            positive("perturbation.width", self.perturbation.width)?;
        }

        self.closure.validate()?;
        self.time_step.validate()?;
        self.output.validate()?;
        self.run.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;
    use uom::si::{kinematic_viscosity::square_meter_per_second, length::meter, time::second};

    #[test]
    fn empty_file_gives_defaults() -> Result<(), ConfigError> {
        let config = ExperimentConfig::from_toml_str("")?;
        assert_eq!(config, ExperimentConfig::default());
        assert_eq!(config.condition.regime, Regime::Cabbeling);
        assert_eq!(config.reference, ReferenceLayer::STANDARD);
        Ok(())
    }

    #[test]
    fn partial_sections_keep_defaults() -> Result<(), ConfigError> {
        let config = ExperimentConfig::from_toml_str(
            r#"
            [condition]
            regime = "stable"
            salinity = 34.8
            temperature = 1.0

            [domain]
            lz = 2.0
            nz = 4

            [grid]
            enabled = false

            [closure]
            salinity_diffusivity = 2e-9

            [time_step]
            max = 0.05

            [output]
            directory = "runs"
            format = "json_lines"
            "#,
        )?;

        assert_eq!(config.condition.regime, Regime::Stable);
        assert_eq!(config.domain.lz.get::<meter>(), 2.0);
        assert_eq!(config.domain.nx, 10);
        assert!(!config.grid.enabled);
        assert_eq!(config.grid.refinement, 1.2);
        assert_eq!(
            config.closure.salinity_diffusivity.get::<square_meter_per_second>(),
            2e-9
        );
        assert_eq!(config.closure.temperature_diffusivity, Closure::default().temperature_diffusivity);
        assert_eq!(config.time_step.max.get::<second>(), 0.05);
        assert_eq!(config.time_step.update_interval, 10);
        assert_eq!(config.output.path_for(Regime::Stable), Path::new("runs/stable.jsonl"));

        Ok(())
    }

    #[test]
    fn isohaline_salinity_may_be_anything() -> Result<(), ConfigError> {
        let config = ExperimentConfig::from_toml_str(
            r#"
            [condition]
            regime = "isohaline"
            salinity = nan
            temperature = 2.0
            "#,
        )?;
        assert_eq!(config.condition.regime, Regime::Isohaline);
        Ok(())
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = ExperimentConfig::from_toml_str("[grid]\nstretching = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(SetupError::DegenerateStretching { .. })
        ));

        let err = ExperimentConfig::from_toml_str("[perturbation]\nwidth = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(SetupError::InvalidParameter {
                name: "perturbation.width",
                ..
            })
        ));

        let err = ExperimentConfig::from_toml_str("[condition]\nregime = \"sideways\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn disabled_perturbation_skips_width() {
        let config = ExperimentConfig::from_toml_str("[perturbation]\nenabled = false\nwidth = 0.0\n");
        assert!(config.is_ok());
    }

    #[test]
    fn load_reads_from_disk() -> Result<(), ConfigError> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[condition]\nregime = \"unstable\"\nsalinity = 34.8\ntemperature = 0.5").unwrap();

        let config = ExperimentConfig::load(file.path())?;
        assert_eq!(config.condition.regime, Regime::Unstable);

        let missing = ExperimentConfig::load(Path::new("/nonexistent/experiment.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        Ok(())
    }

    #[test]
    fn round_trips_through_toml() -> Result<(), ConfigError> {
        let config = ExperimentConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ExperimentConfig::from_toml_str(&text)?, config);
        Ok(())
    }
}
