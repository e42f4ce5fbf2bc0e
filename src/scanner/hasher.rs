//! Streaming file hasher.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing content
//! digests of files without loading them into memory. Files are read
//! sequentially in chunks of at most `buffer_size` bytes and each chunk is
//! fed to an incremental accumulator.
//!
//! MD5 is the default algorithm so that digests stay comparable with
//! documents written by earlier runs. SHA-256 and BLAKE3 are available for
//! new scans.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(HashAlgorithm::Blake3, 64 * 1024);
//! let hashed = hasher.hash_file(Path::new("Cargo.toml")).unwrap();
//! println!("{} ({} bytes)", hashed.digest, hashed.bytes);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 65_536;

/// Largest read buffer a hasher will allocate (64 MiB).
pub const MAX_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Content digest algorithm.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (32 hex characters)
    #[default]
    Md5,
    /// SHA-256 (64 hex characters)
    Sha256,
    /// BLAKE3 (64 hex characters)
    Blake3,
}

impl HashAlgorithm {
    /// Length of a hex digest produced by this algorithm.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha256 | Self::Blake3 => 64,
        }
    }

    fn accumulator(self) -> Accumulator {
        match self {
            Self::Md5 => Accumulator::Md5(Md5::new()),
            Self::Sha256 => Accumulator::Sha256(Sha256::new()),
            Self::Blake3 => Accumulator::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Incremental hash state for one file.
enum Accumulator {
    Md5(Md5),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Md5(h) => h.update(chunk),
            Self::Sha256(h) => h.update(chunk),
            Self::Blake3(h) => {
                h.update(chunk);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Result of hashing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedFile {
    /// Lowercase hex digest of the full content
    pub digest: String,
    /// Path that was hashed
    pub path: PathBuf,
    /// Number of bytes read
    pub bytes: u64,
}

/// Streaming file hasher.
///
/// `Hasher` holds no per-file state, so a copy can be moved into every
/// worker task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hasher {
    algorithm: HashAlgorithm,
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default(), DEFAULT_BUFFER_SIZE)
    }
}

impl Hasher {
    /// Create a hasher. `buffer_size` is clamped to `1..=MAX_BUFFER_SIZE`.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm, buffer_size: usize) -> Self {
        Self {
            algorithm,
            buffer_size: buffer_size.clamp(1, MAX_BUFFER_SIZE),
        }
    }

    /// The configured algorithm.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// The configured read buffer size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Hash the full content of the file at `path`.
    ///
    /// An empty file yields the algorithm's empty-input digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or a read fails.
    pub fn hash_file(&self, path: &Path) -> Result<HashedFile, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        let mut accumulator = self.algorithm.accumulator();
        let mut buffer = vec![0u8; self.buffer_size];
        let mut bytes = 0u64;

        loop {
            let read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path.to_path_buf(), e)),
            };
            accumulator.update(&buffer[..read]);
            bytes += read as u64;
        }

        Ok(HashedFile {
            digest: accumulator.finalize_hex(),
            path: path.to_path_buf(),
            bytes,
        })
    }
}
