//! Scanner module for directory enumeration and file hashing.
//!
//! This module provides functionality for:
//! - Per-directory enumeration of regular files using walkdir
//! - Streaming content digests (MD5, SHA-256 or BLAKE3)
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal yielding one batch of file names per directory
//! - [`hasher`]: Buffered, streaming file digests
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let hasher = Hasher::default();
//!
//! for batch in walker.batches().filter_map(Result::ok) {
//!     for path in batch.paths() {
//!         match hasher.hash_file(&path) {
//!             Ok(hashed) => println!("{}  {}", hashed.digest, path.display()),
//!             Err(e) => eprintln!("Warning: {}", e),
//!         }
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

// Re-export main types
pub use hasher::{HashAlgorithm, HashedFile, Hasher, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
pub use walker::{count_root_files, validate_root, DirectoryBatch, Walker};

/// Configuration for directory enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Follow symbolic links to files and directories.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

impl WalkerConfig {
    /// Create a new configuration from CLI arguments.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
        }
    }
}

/// Errors that can occur while enumerating a directory tree.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The scan root does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The scan root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission was denied when reading a directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Whether this error means the scan root itself is unusable.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NotADirectory(_))
    }

    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::NotADirectory(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }

    pub(crate) fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Errors that can occur while hashing a single file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was not found (possibly removed mid-scan).
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while opening or reading `path`.
    pub(crate) fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
