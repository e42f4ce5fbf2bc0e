//! dupescan - Concurrent, resumable duplicate file finder
//!
//! Walks a directory tree, fingerprints every file's content on a bounded
//! worker pool, and splits the results into a duplicates document (digest
//! to every path sharing it) and a uniques document (digest to its single
//! path). Both documents are rewritten after every hashed file, so an
//! interrupted run can be resumed from them.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod session;
pub mod signal;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::remove_empty_dirs;
use crate::cli::{resolve_path, CleanArgs, Cli, Commands, HashArgs, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the subcommand selected on the command line.
///
/// Logging must already be initialized; the binary does that before
/// calling this.
///
/// # Errors
///
/// Configuration problems (missing root, missing or unreadable documents
/// on restart, invalid settings) and persistence failures are returned as
/// errors. Per-file hashing failures are not errors; they turn into
/// [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Hash(ref args) => handle_hash(args, cli.quiet, cli.no_color),
        Commands::Clean(ref args) => handle_clean(args, cli.quiet),
    }
}

fn handle_hash(args: &HashArgs, quiet: bool, no_color: bool) -> Result<ExitCode> {
    let mut config = Config::load();
    config.apply_hash_args(args);
    config.validate().context("Invalid configuration")?;

    let root = resolve_path(&args.dir);
    let handler = signal::install_handler().context("Failed to set up Ctrl+C handling")?;

    let finder_config = config
        .finder_config()
        .with_restart(args.restart)
        .with_count_extension(args.count_ext.clone())
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));
    log::debug!("Finder configuration: {:?}", finder_config);

    let finder = DuplicateFinder::new(finder_config);
    let outcome = finder
        .run(&root)
        .with_context(|| format!("Hash run over {} failed", root.display()))?;
    let exit_code = ExitCode::from_summary(&outcome.summary);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text if quiet => {}
        OutputFormat::Text => {
            let color = !no_color && stdout.is_terminal();
            TextOutput::new(&outcome.summary, &config.duplicates_path, &config.uniques_path)
                .write_to(&mut out, color)
                .context("Failed to write summary")?;
        }
        OutputFormat::Json => {
            JsonOutput::new(
                &outcome.summary,
                exit_code,
                &config.duplicates_path,
                &config.uniques_path,
            )
            .write_to(&mut out, true)
            .context("Failed to write JSON summary")?;
        }
    }

    Ok(exit_code)
}

fn handle_clean(args: &CleanArgs, quiet: bool) -> Result<ExitCode> {
    let root = resolve_path(&args.dir);
    let report = remove_empty_dirs(&root, args.dry_run)
        .with_context(|| format!("Cannot clean {}", root.display()))?;

    if !quiet {
        for dir in &report.removed {
            println!("{}", dir.display());
        }
        for (dir, error) in &report.failures {
            eprintln!("Failed: {}: {}", dir.display(), error);
        }
        println!("{}", report.summary());
    }

    Ok(if report.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}
