//! Keyed entries written to a run's output artifact.
//!
//! An artifact holds one entry per key. [`Experiment::launch`] creates it
//! fresh, writes the non-dimensional numbers, and then hands it to the
//! engine, which appends its snapshots through [`Artifact::append`] so both
//! sides agree on the container.
//!
//! Two containers are available:
//!
//! - [`ArtifactFormat::JsonLines`]: one `{"key": ..., "value": ...}` line per
//!   entry, in a `.jsonl` file.
//! - [`ArtifactFormat::Jld2`]: an HDF5 file with a `.jld2` extension, where
//!   each entry is a group or dataset named by its key. Needs the `hdf5`
//!   feature.
//!
//! [`Experiment::launch`]: crate::run::Experiment::launch

#[cfg(feature = "hdf5")]
mod jld2;

use std::{
    fmt,
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key of the non-dimensional report entry.
pub const NON_DIMENSIONAL_KEY: &str = "Non_dimensional_numbers";

/// On-disk container of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    JsonLines,
    Jld2,
}

impl ArtifactFormat {
    /// Returns the file extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactFormat::JsonLines => "jsonl",
            ArtifactFormat::Jld2 => "jld2",
        }
    }

    /// Whether this build can write the format.
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            ArtifactFormat::JsonLines => true,
            ArtifactFormat::Jld2 => cfg!(feature = "hdf5"),
        }
    }
}

/// JLD2 when built with HDF5 support, JSON lines otherwise.
impl Default for ArtifactFormat {
    fn default() -> Self {
        if cfg!(feature = "hdf5") {
            ArtifactFormat::Jld2
        } else {
            ArtifactFormat::JsonLines
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode entry `{key}`")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{operation} is not supported for `{format}` artifacts in this build")]
    Unsupported {
        format: ArtifactFormat,
        operation: &'static str,
    },

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error in `{}`", path.display())]
    Hdf5 {
        path: PathBuf,
        #[source]
        source: hdf5::Error,
    },
}

/// One entry of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub key: String,
    pub value: T,
}

#[derive(Serialize)]
struct BorrowedEntry<'a, T> {
    key: &'a str,
    value: &'a T,
}

/// An output file and the container it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    format: ArtifactFormat,
}

impl Artifact {
    /// Refers to an artifact without touching the file system.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: ArtifactFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Creates an empty artifact at `path`, discarding any previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] (or [`ArtifactError::Hdf5`]) if the file
    /// cannot be created, or [`ArtifactError::Unsupported`] if this build
    /// cannot write `format`.
    pub fn create(path: impl Into<PathBuf>, format: ArtifactFormat) -> Result<Self, ArtifactError> {
        let artifact = Self::new(path, format);

        match format {
            ArtifactFormat::JsonLines => {
                File::create(&artifact.path).map_err(|source| artifact.io_error(source))?;
            }
            #[cfg(feature = "hdf5")]
            ArtifactFormat::Jld2 => {
                jld2::create(&artifact.path).map_err(|source| artifact.hdf5_error(source))?;
            }
            #[cfg(not(feature = "hdf5"))]
            ArtifactFormat::Jld2 => {
                return Err(ArtifactError::Unsupported {
                    format,
                    operation: "writing",
                });
            }
        }

        log::debug!("created {format} artifact {}", artifact.path.display());
        Ok(artifact)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `value` under `key`.
    ///
    /// The entry is encoded in memory before the file is opened, so an
    /// encoding failure leaves the artifact untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Encode`] if `value` cannot be serialized, or
    /// an I/O or HDF5 error if the file cannot be opened or written.
    pub fn append<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ArtifactError> {
        let encode_error = |source| ArtifactError::Encode {
            key: key.to_owned(),
            source,
        };

        match self.format {
            ArtifactFormat::JsonLines => {
                let mut line =
                    serde_json::to_string(&BorrowedEntry { key, value }).map_err(encode_error)?;
                line.push('\n');

                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)
                    .map_err(|source| self.io_error(source))?;
                file.write_all(line.as_bytes())
                    .and_then(|()| file.flush())
                    .map_err(|source| self.io_error(source))?;
            }
            #[cfg(feature = "hdf5")]
            ArtifactFormat::Jld2 => {
                let value = serde_json::to_value(value).map_err(encode_error)?;
                jld2::append(&self.path, key, &value).map_err(|source| self.hdf5_error(source))?;
            }
            #[cfg(not(feature = "hdf5"))]
            ArtifactFormat::Jld2 => {
                return Err(ArtifactError::Unsupported {
                    format: self.format,
                    operation: "writing",
                });
            }
        }

        log::debug!("appended `{key}` to {}", self.path.display());
        Ok(())
    }

    /// Reads every entry as untyped JSON.
    ///
    /// Only JSON-lines artifacts can be read back; JLD2 files are meant for
    /// HDF5 tooling.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Io`] if the file cannot be read,
    /// [`ArtifactError::Encode`] if a line is not a valid entry, or
    /// [`ArtifactError::Unsupported`] for JLD2 artifacts.
    pub fn read_entries(&self) -> Result<Vec<Entry<serde_json::Value>>, ArtifactError> {
        if self.format != ArtifactFormat::JsonLines {
            return Err(ArtifactError::Unsupported {
                format: self.format,
                operation: "reading",
            });
        }

        let contents = std::fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|source| ArtifactError::Encode {
                    key: format!("line {}", n + 1),
                    source,
                })
            })
            .collect()
    }

    fn io_error(&self, source: io::Error) -> ArtifactError {
        ArtifactError::Io {
            path: self.path.clone(),
            source,
        }
    }

    #[cfg(feature = "hdf5")]
    fn hdf5_error(&self, source: hdf5::Error) -> ArtifactError {
        ArtifactError::Hdf5 {
            path: self.path.clone(),
            source,
        }
    }
}
