//! Duplicate set resolution.
//!
//! For each duplicate set, in discovery order, the first file is kept and
//! every other file is deleted. Each decision is appended to the
//! [`ActionLog`] under a single timestamp captured when resolution starts.
//!
//! Before deleting anything the kept file is hashed again. If it no longer
//! matches the group hash (changed or vanished since the scan), the other
//! members of the set are left on disk and logged as `Failed`, so the last
//! copy of some content is never removed.

use std::io::Write;
use std::path::Path;

use chrono::Local;

use super::delete::delete_file;
use crate::duplicates::DuplicateGroup;
use crate::output::action_log::{ActionLog, LogError, LogRecord, TIMESTAMP_FORMAT};
use crate::scanner::{hash_to_hex, Hasher};

/// Reason recorded when the kept copy no longer matches its group.
pub const KEPT_CHANGED: &str = "kept copy changed since scan";

/// Counters for a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    /// Duplicate sets processed
    pub groups: usize,
    /// Files retained (one per set)
    pub kept: usize,
    /// Files removed (or that would be removed in a dry run)
    pub deleted: usize,
    /// Files that could not be removed
    pub failed: usize,
    /// Bytes reclaimed by the removed files
    pub bytes_freed: u64,
}

/// Keeps the first copy of each duplicate set and deletes the rest.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    hasher: &'a Hasher,
    quiet: bool,
}

impl<'a> Resolver<'a> {
    /// Create a resolver that re-hashes kept files with `hasher`.
    #[must_use]
    pub fn new(hasher: &'a Hasher) -> Self {
        Self {
            hasher,
            quiet: false,
        }
    }

    /// Suppress per-file console output.
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn say(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    /// Delete the redundant copies and log every action.
    ///
    /// Per-file deletion failures are recorded and skipped; they never abort
    /// the pass.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if a row cannot be written to the log.
    pub fn resolve<W: Write>(
        &self,
        groups: &[DuplicateGroup],
        sink: &mut ActionLog<W>,
    ) -> Result<ResolveSummary, LogError> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let mut summary = ResolveSummary::default();

        for group in groups {
            self.resolve_group(group, &timestamp, sink, &mut summary)?;
        }

        log::info!(
            "Resolved {} duplicate sets: {} deleted, {} failed",
            summary.groups,
            summary.deleted,
            summary.failed
        );
        Ok(summary)
    }

    fn resolve_group<W: Write>(
        &self,
        group: &DuplicateGroup,
        timestamp: &str,
        sink: &mut ActionLog<W>,
        summary: &mut ResolveSummary,
    ) -> Result<(), LogError> {
        let group_hex = group.hash_hex();
        let kept = group.kept();
        summary.groups += 1;
        summary.kept += 1;

        let blocked = match self.hasher.hash_file(kept) {
            Ok(hash) if hash == group.hash => {
                sink.record(&LogRecord::kept(timestamp, kept, &group_hex))?;
                None
            }
            Ok(hash) => {
                log::warn!("{}: {}", KEPT_CHANGED, kept.display());
                sink.record(&LogRecord::kept(timestamp, kept, &hash_to_hex(&hash)))?;
                Some(KEPT_CHANGED.to_string())
            }
            Err(e) => {
                log::warn!("Cannot re-read kept file {}: {}", kept.display(), e);
                sink.record(&LogRecord::kept(timestamp, kept, &group_hex))?;
                Some(e.to_string())
            }
        };

        for duplicate in group.duplicates() {
            let failure = match &blocked {
                Some(reason) => Some(reason.clone()),
                None => match delete_file(duplicate) {
                    Ok(result) => {
                        self.say(&format!("Deleted: {}", duplicate.display()));
                        sink.record(&LogRecord::deleted(timestamp, duplicate, &group_hex))?;
                        summary.deleted += 1;
                        summary.bytes_freed += result.size;
                        None
                    }
                    Err(e) => Some(e.to_string()),
                },
            };

            if let Some(reason) = failure {
                self.report_failure(duplicate, &reason);
                sink.record(&LogRecord::failed(timestamp, duplicate, &group_hex, &reason))?;
                summary.failed += 1;
            }
        }

        Ok(())
    }

    fn report_failure(&self, path: &Path, reason: &str) {
        log::debug!("Deletion failed for {}: {}", path.display(), reason);
        self.say(&format!("Failed to delete {}: {}", path.display(), reason));
    }

    /// Report what [`resolve`](Self::resolve) would delete, touching nothing.
    #[must_use]
    pub fn preview(&self, groups: &[DuplicateGroup]) -> ResolveSummary {
        let mut summary = ResolveSummary::default();

        for group in groups {
            summary.groups += 1;
            summary.kept += 1;
            self.say(&format!("Keep: {}", group.kept().display()));
            for duplicate in group.duplicates() {
                self.say(&format!("Would delete: {}", duplicate.display()));
                summary.deleted += 1;
                summary.bytes_freed += std::fs::metadata(duplicate).map_or(0, |m| m.len());
            }
        }

        summary
    }
}
