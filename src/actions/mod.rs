//! File actions module.
//!
//! Actions run on the filesystem independently of a scan. Currently this
//! is the removal of empty directories, typically after duplicates have
//! been deleted by hand.
//!
//! ```no_run
//! use dupescan::actions::remove_empty_dirs;
//! use std::path::Path;
//!
//! let report = remove_empty_dirs(Path::new("/data"), false).unwrap();
//! println!("{}", report.summary());
//! ```

pub mod empty_dirs;

pub use empty_dirs::{remove_empty_dirs, CleanupReport};
