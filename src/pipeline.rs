//! One end-to-end run: enumerate, hash, group, resolve.
//!
//! Every stage receives what it needs from the [`RunConfig`]; nothing is read
//! from globals. Console lines go to stdout unless the run is quiet;
//! diagnostics go through `log`.

use std::sync::Arc;

use bytesize::ByteSize;

use crate::actions::{ResolveSummary, Resolver};
use crate::cache::HashCache;
use crate::config::RunConfig;
use crate::duplicates::{DuplicateFinder, FinderConfig, HashStats};
use crate::error::PipelineError;
use crate::output::ActionLog;
use crate::progress::{ProgressCallback, PHASE_WALKING};
use crate::scanner::Walker;

/// What a run found and did.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Regular files enumerated under the root
    pub files_found: usize,
    /// Hashing statistics
    pub hash_stats: HashStats,
    /// Content groups with more than one file
    pub duplicate_groups: usize,
    /// Resolution counters; `None` when there was nothing to resolve
    pub resolution: Option<ResolveSummary>,
}

impl RunReport {
    /// Files deleted (or that would be, in a dry run).
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.resolution.as_ref().map_or(0, |r| r.deleted)
    }

    /// Files that could not be deleted.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.resolution.as_ref().map_or(0, |r| r.failed)
    }
}

struct Console {
    quiet: bool,
}

impl Console {
    fn say(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }
}

/// Run the whole pipeline once.
///
/// # Errors
///
/// Returns [`PipelineError`] when the root cannot be walked, the hashing pool
/// cannot start, or the action log cannot be written. Unreadable files,
/// failed deletions and cache problems are reported and do not abort.
pub fn run(
    config: &RunConfig,
    progress: Arc<dyn ProgressCallback>,
) -> Result<RunReport, PipelineError> {
    let console = Console {
        quiet: config.quiet,
    };
    let mut report = RunReport::default();

    progress.on_phase_start(PHASE_WALKING, 0);
    let walked = Walker::new(&config.root).collect_files();
    progress.on_phase_end(PHASE_WALKING);
    let files = walked?;
    report.files_found = files.len();

    let store = HashCache::new(&config.cache_file);
    let previous = store.load();

    console.say(&format!(
        "Scanning {} files using SHA-256 + cache...",
        files.len()
    ));

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_hash_threads(config.hash_threads)
            .with_progress_callback(progress),
    );
    let outcome = finder.hash_and_group(&files, &previous)?;

    console.say(&format!(
        "Finished hashing in {:.1} seconds.",
        outcome.stats.elapsed.as_secs_f64()
    ));

    if let Err(e) = store.save(&outcome.cache) {
        log::warn!("Could not save hash cache: {}", e);
    }

    let groups = outcome.groups.into_duplicates();
    report.hash_stats = outcome.stats;
    report.duplicate_groups = groups.len();

    if groups.is_empty() {
        console.say("No duplicates found.");
        return Ok(report);
    }

    let resolver = Resolver::new(finder.hasher()).quiet(config.quiet);
    let summary = if config.dry_run {
        let summary = resolver.preview(&groups);
        console.say(&format!(
            "Dry run: {} files would be deleted, freeing {}.",
            summary.deleted,
            ByteSize::b(summary.bytes_freed)
        ));
        summary
    } else {
        let mut sink = ActionLog::open(&config.log_file)?;
        let summary = resolver.resolve(&groups, &mut sink)?;
        log::debug!(
            "Appended {} rows to {}",
            sink.rows_written(),
            config.log_file.display()
        );
        console.say(&format!(
            "Deleted {} duplicate files ({} failed), freed {}.",
            summary.deleted,
            summary.failed,
            ByteSize::b(summary.bytes_freed)
        ));
        console.say(&format!("CSV log saved to: {}", config.log_file.display()));
        summary
    };

    report.resolution = Some(summary);
    Ok(report)
}
