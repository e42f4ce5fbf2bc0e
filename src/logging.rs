//! Logging setup for the `dupescan` binary.
//!
//! Records go through the `log` facade to an `env_logger` backend on
//! stderr, so they never mix with the text or JSON report on stdout.
//!
//! The level comes from `RUST_LOG` when it is set. Otherwise the CLI flags
//! decide, and only this crate's records pass below `warn`:
//!
//! | flags   | dupescan | dependencies |
//! |---------|----------|--------------|
//! | `-q`    | error    | error        |
//! | (none)  | info     | warn         |
//! | `-v`    | debug    | warn         |
//! | `-vv`   | trace    | warn         |
//!
//! At `info` a run logs its phase boundaries and final counts. `debug`
//! adds every document write, `trace` every skipped file. Once `-v` is
//! given each line also carries a millisecond timestamp and the module
//! that emitted it, which makes the write cadence of a run visible.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupescan::logging::init_logging;
//!
//! // -v, colors allowed
//! init_logging(1, false, false);
//! ```

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;
use std::env;
use std::io::Write;

const CRATE_TARGET: &str = "dupescan";

/// Line layout of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    /// `INFO  message`
    Compact,
    /// `2024-01-01T00:00:00.000Z DEBUG [session::io] message`
    Detailed,
}

impl LineStyle {
    fn for_verbosity(verbose: u8) -> Self {
        if verbose == 0 {
            Self::Compact
        } else {
            Self::Detailed
        }
    }
}

/// Initialize the logging backend from the CLI flags.
///
/// `verbose` is the `-v` count, `quiet` limits output to errors and
/// `no_color` disables ANSI styling of level names. `RUST_LOG` overrides
/// both level flags.
///
/// # Panics
///
/// Panics if a logger was already installed in this process.
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let rust_log = env::var("RUST_LOG").ok();
    let level = crate_level(verbose, quiet);

    let mut builder = Builder::new();
    match rust_log {
        Some(ref spec) => {
            builder.parse_filters(spec);
        }
        None => {
            builder
                .filter_level(dependency_level(quiet))
                .filter_module(CRATE_TARGET, level);
        }
    }

    if no_color {
        builder.write_style(WriteStyle::Never);
    }

    configure_format(&mut builder, LineStyle::for_verbosity(verbose));
    builder.init();

    match rust_log {
        Some(spec) => log::debug!("Log filter taken from RUST_LOG: {spec}"),
        None => log::debug!("Logging at {level}"),
    }
}

/// Level for this crate's own records.
fn crate_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn dependency_level(quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    }
}

/// Module path relative to the crate root; foreign targets are kept whole.
fn short_target(target: &str) -> &str {
    match target.strip_prefix(CRATE_TARGET) {
        Some("") => CRATE_TARGET,
        Some(rest) => rest.strip_prefix("::").unwrap_or(target),
        None => target,
    }
}

fn configure_format(builder: &mut Builder, style: LineStyle) {
    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);
        match style {
            LineStyle::Compact => writeln!(
                buf,
                "{level_style}{level:<5}{level_style:#} {}",
                record.args()
            ),
            LineStyle::Detailed => writeln!(
                buf,
                "{} {level_style}{level:<5}{level_style:#} [{}] {}",
                buf.timestamp_millis(),
                short_target(record.target()),
                record.args()
            ),
        }
    });
}
