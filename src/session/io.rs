//! Loading and writing the duplicates/uniques documents.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::duplicates::Partition;
use crate::session::data::ResumeState;

/// Errors raised while reading or writing persisted scan state.
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    /// A document required for a restart does not exist.
    #[error("{0} must exist to restart a hash run")]
    MissingArtifact(PathBuf),

    /// A document could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Document path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A document is not valid JSON of the expected shape.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Document path
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The partition could not be serialized.
    #[error("Failed to serialize scan state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A document could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Document path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Load a previous run's documents for a restart.
///
/// Uniques are lifted to one-element sequences and merged with the
/// duplicates; the skip set holds the base name of every merged path.
///
/// # Errors
///
/// [`StateError::MissingArtifact`] if either file is absent, otherwise a
/// read or parse error naming the offending document.
pub fn load_state(duplicates_path: &Path, uniques_path: &Path) -> Result<ResumeState, StateError> {
    log::info!("Restarting hashing process");

    for path in [duplicates_path, uniques_path] {
        if !path.is_file() {
            return Err(StateError::MissingArtifact(path.to_path_buf()));
        }
    }

    let partition = Partition {
        duplicates: read_document::<BTreeMap<String, Vec<String>>>(duplicates_path)?,
        uniques: read_document::<BTreeMap<String, String>>(uniques_path)?,
    };
    log::info!(
        "Loaded {} duplicate groups and {} unique files from previous run",
        partition.duplicate_groups(),
        partition.unique_files()
    );

    let state = ResumeState::new(partition.into_store());
    log::debug!("{} file names will be skipped", state.skip.len());
    Ok(state)
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, StateError> {
    let content = fs::read_to_string(path).map_err(|source| StateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the full partition to the duplicates and uniques documents.
#[derive(Debug, Clone)]
pub struct StateWriter {
    duplicates_path: PathBuf,
    uniques_path: PathBuf,
    writes: usize,
}

impl StateWriter {
    /// Create a writer for the two document paths.
    #[must_use]
    pub fn new(duplicates_path: impl Into<PathBuf>, uniques_path: impl Into<PathBuf>) -> Self {
        Self {
            duplicates_path: duplicates_path.into(),
            uniques_path: uniques_path.into(),
            writes: 0,
        }
    }

    /// Path of the duplicates document.
    #[must_use]
    pub fn duplicates_path(&self) -> &Path {
        &self.duplicates_path
    }

    /// Path of the uniques document.
    #[must_use]
    pub fn uniques_path(&self) -> &Path {
        &self.uniques_path
    }

    /// Number of completed [`write`](Self::write) calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Overwrite both documents with `partition`.
    ///
    /// Each document is replaced atomically, so a reader never observes a
    /// half-written file.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if serialization or either write fails.
    pub fn write(&mut self, partition: &Partition) -> Result<(), StateError> {
        write_document(&self.duplicates_path, &partition.duplicates)?;
        write_document(&self.uniques_path, &partition.uniques)?;
        self.writes += 1;
        Ok(())
    }
}

fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StateError> {
    log::debug!("Writing outputs to: {}", path.display());
    let json = serde_json::to_string_pretty(value)?;

    let write_err = |source: std::io::Error| StateError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(json.as_bytes()).map_err(write_err)?;
    if let Ok(existing) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
