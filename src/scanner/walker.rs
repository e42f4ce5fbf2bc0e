//! Directory walker yielding one batch of file names per directory.
//!
//! # Overview
//!
//! [`Walker`] visits every directory below a root (root first, depth-first,
//! entries sorted by name) and yields a [`DirectoryBatch`] holding the
//! names of the regular files directly inside it. Hashing is dispatched
//! per batch, so the walk is sequential and uses [`walkdir`].
//!
//! [`count_root_files`] is a cheap, non-recursive count used only to size
//! the progress bar. Files in subdirectories are not counted, so the total
//! is an estimate for nested trees.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/data"), WalkerConfig::default());
//! for batch in walker.batches() {
//!     match batch {
//!         Ok(batch) => println!("{}: {} files", batch.dir.display(), batch.len()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{ScanError, WalkerConfig};

/// Regular files found directly inside one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryBatch {
    /// Directory that was read
    pub dir: PathBuf,
    /// Bare file names, sorted
    pub file_names: Vec<String>,
}

impl DirectoryBatch {
    /// Full paths of every file in the batch.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.file_names.iter().map(|name| self.dir.join(name))
    }

    /// Number of files in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.file_names.len()
    }

    /// Whether the directory holds no regular files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_names.is_empty()
    }
}

/// Per-directory tree enumerator.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, config: WalkerConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    /// Root directory of the walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree, yielding one batch per directory.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration, so one unreadable directory does not end the walk.
    pub fn batches(&self) -> impl Iterator<Item = Result<DirectoryBatch, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0 || !(skip_hidden && is_hidden(entry.file_name()))
            })
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => Some(self.read_batch(entry.path())),
                Ok(_) => None,
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), Path::to_path_buf);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(ScanError::from_io(path, e.into())))
                }
            })
    }

    /// Collect the regular file names directly inside `dir`.
    fn read_batch(&self, dir: &Path) -> Result<DirectoryBatch, ScanError> {
        let entries = fs::read_dir(dir).map_err(|e| {
            log::warn!("Cannot read directory {}: {}", dir.display(), e);
            ScanError::from_io(dir.to_path_buf(), e)
        })?;

        let mut file_names = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let name = entry.file_name();
            if self.config.skip_hidden && is_hidden(&name) {
                log::trace!("Skipping hidden file: {}", entry.path().display());
                continue;
            }
            if !self.is_regular_file(&entry) {
                continue;
            }

            match name.into_string() {
                Ok(name) => file_names.push(name),
                Err(raw) => {
                    log::warn!(
                        "Skipping file with non UTF-8 name in {}: {:?}",
                        dir.display(),
                        raw
                    );
                }
            }
        }

        file_names.sort();
        log::trace!("{}: {} files", dir.display(), file_names.len());

        Ok(DirectoryBatch {
            dir: dir.to_path_buf(),
            file_names,
        })
    }

    fn is_regular_file(&self, entry: &fs::DirEntry) -> bool {
        match entry.file_type() {
            Ok(ft) if ft.is_file() => true,
            Ok(ft) if ft.is_symlink() && self.config.follow_symlinks => {
                fs::metadata(entry.path()).is_ok_and(|m| m.is_file())
            }
            Ok(_) => false,
            Err(e) => {
                log::debug!("Cannot stat {}: {}", entry.path().display(), e);
                false
            }
        }
    }
}

fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

/// Check that `root` exists and is a directory.
///
/// # Errors
///
/// [`ScanError::NotFound`] or [`ScanError::NotADirectory`] for an unusable
/// root, [`ScanError::Io`] when its metadata cannot be read.
pub fn validate_root(root: &Path) -> Result<(), ScanError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ScanError::NotFound(root.to_path_buf())),
        Err(e) => Err(ScanError::from_io(root.to_path_buf(), e)),
    }
}

/// Count regular files directly inside `root` whose name ends with
/// `extension` (every regular file when `None`).
///
/// Subdirectories are not descended into.
///
/// # Errors
///
/// Fails with a configuration error when `root` is missing or is not a
/// directory.
pub fn count_root_files(root: &Path, extension: Option<&str>) -> Result<usize, ScanError> {
    validate_root(root)?;
    log::info!(
        "Calculating number of files that will be hashed in {}",
        root.display()
    );

    let count = fs::read_dir(root)
        .map_err(|e| ScanError::from_io(root.to_path_buf(), e))?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_file()))
        .filter(|entry| match extension {
            Some(ext) => entry.file_name().to_string_lossy().ends_with(ext),
            None => true,
        })
        .count();

    log::info!("{} files to be hashed in {}", count, root.display());
    Ok(count)
}
