use std::path::Path;

use anyhow::{Context, Result};
use cabbeling_setup::ExperimentConfig;
use serde::{Deserialize, Serialize};

/// A runner config file: an experiment plus runner-only settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunFile {
    #[serde(flatten)]
    pub experiment: ExperimentConfig,
    /// Verbosity of logging.
    #[serde(default)]
    pub logging: Logging,
}

impl RunFile {
    /// Reads, parses, and validates the run file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid run file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: Self = toml::from_str(text).context("Failed to parse run file")?;
        file.experiment.validate()?;
        Ok(file)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logging {
    /// Verbosity of logging, from 0 (off) to 5 (trace).
    pub level: usize,
}

impl Default for Logging {
    fn default() -> Self {
        Self { level: Self::INFO }
    }
}

impl Logging {
    pub const OFF: usize = 0;
    pub const ERROR: usize = 1;
    pub const WARN: usize = 2;
    pub const INFO: usize = 3;
    pub const DEBUG: usize = 4;
    pub const TRACE: usize = 5;

    /// Converts a logging level to a `log::LevelFilter`.
    pub fn filter(&self) -> log::LevelFilter {
        match self.level {
            Self::OFF => log::LevelFilter::Off,
            Self::ERROR => log::LevelFilter::Error,
            Self::WARN => log::LevelFilter::Warn,
            Self::INFO => log::LevelFilter::Info,
            Self::DEBUG => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
