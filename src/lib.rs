//! DupliCheck - content-hash duplicate remover
//!
//! Walks a directory tree, hashes every regular file with SHA-256 (reusing
//! cached hashes for files whose modification time and size are unchanged),
//! keeps the first copy of each set of identical files and deletes the rest.
//! Every decision is appended to a CSV log.

pub mod actions;
pub mod cache;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod scanner;

use std::sync::Arc;

use anyhow::Result;

use cli::Cli;
use config::Config;
use error::ExitCode;
use progress::Progress;

/// Run the application for parsed command-line arguments.
///
/// Loads the layered configuration, applies the flags on top, asks for the
/// folder when none was given, then runs the pipeline once.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the prompt fails, or the
/// pipeline aborts.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = cli.apply_to(Config::load(cli.config.as_deref())?);
    if log::log_enabled!(log::Level::Debug) {
        match config.to_toml() {
            Ok(text) => log::debug!("Effective configuration:\n{}", text),
            Err(e) => log::debug!("Configuration: {:?} ({})", config, e),
        }
    }

    let root = match &cli.path {
        Some(path) => path.clone(),
        None => cli::prompt_for_root_interactive()?,
    };

    let run_config = config
        .for_root(root)
        .with_dry_run(cli.dry_run)
        .with_quiet(cli.quiet);

    let report = pipeline::run(&run_config, Arc::new(Progress::new(cli.quiet)))?;
    log::debug!(
        "Run finished: {} files, {} duplicate sets, {} deleted, {} failed",
        report.files_found,
        report.duplicate_groups,
        report.deleted(),
        report.failed()
    );

    Ok(ExitCode::Success)
}
