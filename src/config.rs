//! Application configuration management.
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory
//! 3. `DUPESCAN_*` environment variables (e.g. `DUPESCAN_WORKERS=8`)
//! 4. Command-line flags
//!
//! # Example
//!
//! ```toml
//! workers = 8
//! algorithm = "blake3"
//! duplicates_path = "/var/lib/dupescan/duplicates.json"
//! uniques_path = "/var/lib/dupescan/uniques.json"
//! ```

use anyhow::Result;
use bytesize::ByteSize;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::HashArgs;
use crate::duplicates::{
    FinderConfig, DEFAULT_DUPLICATES_PATH, DEFAULT_UNIQUES_PATH, DEFAULT_WORKERS,
};
use crate::scanner::{HashAlgorithm, WalkerConfig, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};

/// Prefix of environment variables read into [`Config`].
pub const ENV_PREFIX: &str = "DUPESCAN_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads per directory batch.
    pub workers: usize,
    /// Read buffer size in bytes.
    pub buffer_size: usize,
    /// Digest algorithm.
    pub algorithm: HashAlgorithm,
    /// Duplicates document path.
    pub duplicates_path: PathBuf,
    /// Uniques document path.
    pub uniques_path: PathBuf,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            algorithm: HashAlgorithm::default(),
            duplicates_path: PathBuf::from(DEFAULT_DUPLICATES_PATH),
            uniques_path: PathBuf::from(DEFAULT_UNIQUES_PATH),
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Never fails: a missing or broken file falls back to the defaults.
    pub fn load() -> Self {
        let result = match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::figment(None).extract().map_err(Into::into),
        };

        match result {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration with `path` as the TOML layer.
    ///
    /// A missing file is treated as empty.
    ///
    /// # Errors
    ///
    /// Fails if the file or an environment variable holds a value of the
    /// wrong type.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Self::figment(Some(path)).extract()?;
        Ok(config)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupescan", "dupescan")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reject settings the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Fails when `workers` is zero or `buffer_size` exceeds
    /// [`MAX_BUFFER_SIZE`].
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be a positive integer");
        }
        if self.buffer_size > MAX_BUFFER_SIZE {
            anyhow::bail!(
                "buffer size must not exceed {} (got {})",
                ByteSize::b(MAX_BUFFER_SIZE as u64),
                ByteSize::b(self.buffer_size as u64)
            );
        }
        Ok(())
    }

    /// Overlay the flags given on the command line.
    pub fn apply_hash_args(&mut self, args: &HashArgs) {
        if let Some(count) = args.count {
            self.workers = usize::try_from(count).unwrap_or(usize::MAX);
        }
        if let Some(size) = args.buffer_size {
            self.buffer_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
        if let Some(algorithm) = args.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(ref path) = args.dupfile {
            self.duplicates_path = path.clone();
        }
        if let Some(ref path) = args.unfile {
            self.uniques_path = path.clone();
        }
        self.follow_symlinks |= args.follow_symlinks;
        self.skip_hidden |= args.skip_hidden;
    }

    /// Dispatcher settings for this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_workers(self.workers)
            .with_buffer_size(self.buffer_size)
            .with_algorithm(self.algorithm)
            .with_walker_config(WalkerConfig::new(self.follow_symlinks, self.skip_hidden))
            .with_output_paths(&self.duplicates_path, &self.uniques_path)
    }
}
