//! Command-line interface definitions for dupescan.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, error format) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Hash a tree with 8 workers
//! dupescan hash ~/Pictures --count 8
//!
//! # Resume an interrupted run with the same output files
//! dupescan hash ~/Pictures --dupfile dups.json --unfile uniques.json --restart
//!
//! # Remove directories left empty after deleting duplicates
//! dupescan clean ~/Pictures --dry-run
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::scanner::HashAlgorithm;

/// Find duplicate files by content fingerprint.
///
/// dupescan hashes every file under a directory, writes a duplicates
/// document (digest to paths) and a uniques document (digest to path),
/// and can resume an interrupted run from those documents.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hash every file under a directory and classify duplicates
    Hash(HashArgs),
    /// Remove empty directories under a directory
    Clean(CleanArgs),
}

/// Arguments for the hash subcommand.
///
/// Options left unset fall back to the configuration file and
/// `DUPESCAN_*` environment variables.
#[derive(Debug, Args)]
pub struct HashArgs {
    /// Directory to hash
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Number of worker threads per directory (default: 4)
    #[arg(short = 'c', long = "count", value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,

    /// Where to write the duplicates document (default: duplicates.json)
    #[arg(long = "dupfile", value_name = "PATH")]
    pub dupfile: Option<PathBuf>,

    /// Where to write the uniques document (default: uniques.json)
    #[arg(long = "unfile", value_name = "PATH")]
    pub unfile: Option<PathBuf>,

    /// Resume from existing duplicates and uniques documents
    ///
    /// Both documents must exist. Files whose name already appears in
    /// them are not hashed again.
    #[arg(long)]
    pub restart: bool,

    /// Read buffer size (e.g., 64KiB, 1MB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub buffer_size: Option<u64>,

    /// Digest algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Only count files with this extension when estimating progress
    #[arg(long = "count-ext", value_name = "EXT")]
    pub count_ext: Option<String>,

    /// Follow symbolic links during the walk
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the clean subcommand.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Directory to clean
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Report empty directories without removing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Format of the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON summary for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupescan::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Expand a leading `~` and canonicalize the path when it exists.
///
/// A path that does not exist is returned expanded but otherwise as given,
/// so the caller can report it.
///
/// # Examples
///
/// ```
/// use dupescan::cli::resolve_path;
/// use std::path::Path;
///
/// let p = resolve_path(Path::new("/definitely/not/here"));
/// assert_eq!(p, Path::new("/definitely/not/here"));
/// ```
#[must_use]
pub fn resolve_path(path: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    match expanded.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) => expanded,
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
