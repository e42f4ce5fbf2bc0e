//! Output formatters for run summaries.
//!
//! - Text for people at a terminal
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::error::ExitCode;
//! use dupescan::output::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let outcome = finder.run(Path::new(".")).unwrap();
//!
//! let config = finder.config();
//! let exit_code = ExitCode::from_summary(&outcome.summary);
//! let output = JsonOutput::new(
//!     &outcome.summary,
//!     exit_code,
//!     &config.duplicates_path,
//!     &config.uniques_path,
//! );
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
