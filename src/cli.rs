//! Command-line interface definitions for DupliCheck.
//!
//! # Example
//!
//! ```bash
//! # Prompt for the folder interactively
//! duplicheck
//!
//! # Scan a folder directly
//! duplicheck ~/Pictures
//!
//! # See what would be removed without deleting anything
//! duplicheck ~/Pictures --dry-run
//!
//! # Hash with four threads and keep the cache somewhere else
//! duplicheck ~/Pictures -j 4 --cache /tmp/dupe-cache.json
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::config::Config;

/// Find files with identical content and delete all but one copy.
///
/// Files are compared by SHA-256. Hashes are cached by path, modification
/// time and size so unchanged files are not re-read on later runs. Every
/// kept, deleted or failed file is appended to a CSV log.
#[derive(Debug, Parser)]
#[command(name = "duplicheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan (prompted for when omitted)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Location of the hash cache file
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Location of the CSV action log
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of hashing threads
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Report what would be deleted without deleting or logging
    #[arg(long)]
    pub dry_run: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    #[must_use]
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(cache) = &self.cache {
            config.cache_file.clone_from(cache);
        }
        if let Some(log) = &self.log {
            config.log_file.clone_from(log);
        }
        if let Some(threads) = self.threads {
            config.hash_threads = threads.max(1);
        }
        config
    }
}

/// Ask for the folder to scan and read one line from `input`.
///
/// # Errors
///
/// Returns an error if reading fails or the answer is empty.
pub fn prompt_for_root<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<PathBuf> {
    write!(output, "Enter folder path to scan: ")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read folder path")?;

    let answer = line.trim();
    if answer.is_empty() {
        bail!("No folder path given");
    }
    Ok(PathBuf::from(answer))
}

/// [`prompt_for_root`] on the process's stdin and stdout.
///
/// # Errors
///
/// See [`prompt_for_root`].
pub fn prompt_for_root_interactive() -> Result<PathBuf> {
    prompt_for_root(io::stdin().lock(), io::stdout())
}
