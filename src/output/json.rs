//! JSON output formatter for run summaries.
//!
//! The duplicates and uniques documents are the run's real output; this is
//! a machine-readable report of the run itself, printed on stdout.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "summary": {
//!     "directories": 3,
//!     "hashed_files": 100,
//!     "skipped_files": 0,
//!     "resumed_files": 0,
//!     "bytes_hashed": 1048576,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 12,
//!     "unique_files": 88,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "failures": [{ "path": "/data/locked.bin", "error": "Permission denied: /data/locked.bin" }],
//!   "duplicates_path": "duplicates.json",
//!   "uniques_path": "uniques.json"
//! }
//! ```

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::duplicates::ScanSummary;
use crate::error::ExitCode;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Directories dispatched
    pub directories: usize,
    /// Files hashed during this run
    pub hashed_files: usize,
    /// Files skipped because a previous run hashed their name
    pub skipped_files: usize,
    /// Paths carried over from a previous run
    pub resumed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Digests shared by two or more paths
    pub duplicate_groups: usize,
    /// Paths inside duplicate groups
    pub duplicate_files: usize,
    /// Paths with unique content
    pub unique_files: usize,
    /// Duration of the run in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            directories: summary.directories,
            hashed_files: summary.hashed_files,
            skipped_files: summary.skipped_files,
            resumed_files: summary.resumed_files,
            bytes_hashed: summary.bytes_hashed,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            unique_files: summary.unique_files,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// A file or directory that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    /// Offending path
    pub path: String,
    /// Error message
    pub error: String,
}

/// Complete JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Run statistics
    pub summary: JsonSummary,
    /// Files that failed to hash and directories that could not be read
    pub failures: Vec<JsonFailure>,
    /// Where the duplicates document was written
    pub duplicates_path: String,
    /// Where the uniques document was written
    pub uniques_path: String,
}

impl JsonOutput {
    /// Build the report for a finished run.
    #[must_use]
    pub fn new(
        summary: &ScanSummary,
        exit_code: ExitCode,
        duplicates_path: &Path,
        uniques_path: &Path,
    ) -> Self {
        let hash_failures = summary.hash_errors.iter().map(|e| JsonFailure {
            path: e.path().to_string_lossy().into_owned(),
            error: e.to_string(),
        });
        let scan_failures = summary.scan_errors.iter().map(|e| JsonFailure {
            path: e.path().to_string_lossy().into_owned(),
            error: e.to_string(),
        });

        Self {
            summary: JsonSummary::from_scan_summary(summary, exit_code),
            failures: hash_failures.chain(scan_failures).collect(),
            duplicates_path: duplicates_path.to_string_lossy().into_owned(),
            uniques_path: uniques_path.to_string_lossy().into_owned(),
        }
    }

    /// Serialize to a compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to an indented JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors while producing JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// Serialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing failed.
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
