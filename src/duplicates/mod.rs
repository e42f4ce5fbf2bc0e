//! Duplicate detection module.
//!
//! This module provides:
//! - The classification store mapping digests to paths
//! - The duplicate/unique partition that gets persisted
//! - The per-directory hashing dispatcher

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ScanOutcome, ScanSummary, DEFAULT_DUPLICATES_PATH,
    DEFAULT_UNIQUES_PATH, DEFAULT_WORKERS,
};
pub use groups::{path_to_record, ClassificationStore, Partition};
