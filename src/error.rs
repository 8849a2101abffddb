//! Pipeline errors and process exit codes.

use thiserror::Error;

use crate::duplicates::FinderError;
use crate::output::LogError;
use crate::scanner::ScanError;

/// Exit codes for the DupliCheck application.
///
/// - 0: Success (completed normally, with or without duplicates)
/// - 1: General error (the run was aborted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run completed.
    Success = 0,
    /// The run was aborted by an error.
    GeneralError = 1,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DC000",
            Self::GeneralError => "DC001",
        }
    }
}

/// Errors that abort a pipeline run.
///
/// Per-file problems (unreadable files, failed deletions, a corrupt cache)
/// are reported and skipped; only these stop the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The scan root could not be walked.
    #[error("cannot scan directory: {0}")]
    Scan(#[from] ScanError),

    /// The hashing stage could not start.
    #[error(transparent)]
    Finder(#[from] FinderError),

    /// The action log could not be opened or written.
    #[error("action log failed: {0}")]
    Log(#[from] LogError),
}
