//! Removal of empty directories left behind after duplicates are deleted.
//!
//! # Overview
//!
//! The tree is walked bottom-up so a directory is visited after all of its
//! children. A directory whose only remaining entries are directories that
//! were already removed is itself removed, which collapses chains of
//! nested empty directories in one pass. The root is never removed.
//!
//! This walk reads only the filesystem and shares no state with a scan.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::actions::remove_empty_dirs;
//! use std::path::Path;
//!
//! let report = remove_empty_dirs(Path::new("/data"), true).unwrap();
//! for dir in &report.removed {
//!     println!("would remove {}", dir.display());
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::scanner::{validate_root, ScanError};

/// Result of an empty-directory cleanup.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Directories removed (or that would be removed in a dry run).
    pub removed: Vec<PathBuf>,
    /// Directories that could not be inspected or removed.
    pub failures: Vec<(PathBuf, String)>,
    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl CleanupReport {
    /// Number of directories removed.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Number of failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every directory was handled.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run {
            "Would remove"
        } else {
            "Removed"
        };
        if self.all_succeeded() {
            format!("{} {} empty director(ies)", verb, self.removed_count())
        } else {
            format!(
                "{} {} empty director(ies), {} failed",
                verb,
                self.removed_count(),
                self.failure_count()
            )
        }
    }
}

/// Remove every empty directory below `root`.
///
/// With `dry_run` nothing is touched; a directory is reported when it
/// holds no files anywhere beneath it.
///
/// # Errors
///
/// Returns [`ScanError`] if `root` is missing or not a directory. Problems
/// with individual directories are collected in the report instead.
pub fn remove_empty_dirs(root: &Path, dry_run: bool) -> Result<CleanupReport, ScanError> {
    validate_root(root)?;
    log::info!("Searching for empty directories in {}", root.display());

    let mut report = CleanupReport {
        dry_run,
        ..Default::default()
    };
    let mut gone: HashSet<PathBuf> = HashSet::new();

    let entries = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .contents_first(true)
        .into_iter();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                log::warn!("Cannot walk {}: {}", path.display(), e);
                report.failures.push((path, e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        match is_effectively_empty(dir, &gone) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                log::warn!("Cannot read {}: {}", dir.display(), e);
                report.failures.push((dir.to_path_buf(), e.to_string()));
                continue;
            }
        }

        if dry_run {
            log::info!("Would remove empty directory: {}", dir.display());
        } else if let Err(e) = fs::remove_dir(dir) {
            log::warn!("Failed to remove {}: {}", dir.display(), e);
            report.failures.push((dir.to_path_buf(), e.to_string()));
            continue;
        } else {
            log::info!("Removed empty directory: {}", dir.display());
        }

        gone.insert(dir.to_path_buf());
        report.removed.push(dir.to_path_buf());
    }

    log::info!("{}", report.summary());
    Ok(report)
}

/// A directory is empty when every entry left in it is a directory that
/// has already been removed.
fn is_effectively_empty(dir: &Path, gone: &HashSet<PathBuf>) -> io::Result<bool> {
    for entry in fs::read_dir(dir)? {
        if !gone.contains(&entry?.path()) {
            return Ok(false);
        }
    }
    Ok(true)
}
