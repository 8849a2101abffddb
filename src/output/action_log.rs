//! Append-only CSV action log.
//!
//! Every decision the resolver makes becomes one row. The file is opened in
//! append mode and never truncated; the header row is written only when the
//! file is new (or empty).
//!
//! # Columns
//!
//! - `Timestamp`: local time of the run, `%Y-%m-%d %H:%M:%S`
//! - `Action`: `Kept`, `Deleted` or `Failed`
//! - `File Path`: path of the file acted on, non-UTF-8 bytes escaped as `\xNN`
//! - `Hash`: SHA-256 hex; for `Failed` rows, `<hash> (<error>)`
//!
//! # Example
//!
//! ```no_run
//! use duplicheck::output::action_log::{ActionLog, LogRecord};
//! use std::path::Path;
//!
//! let mut log = ActionLog::open(Path::new("cleanup.csv")).unwrap();
//! log.record(&LogRecord::kept("2024-01-01 00:00:00", Path::new("/a.txt"), "ab12"))
//!     .unwrap();
//! ```

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::scanner::escape_path;

/// Header row of the action log.
pub const LOG_HEADER: [&str; 4] = ["Timestamp", "Action", "File Path", "Hash"];

/// Timestamp format used for every row.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while writing the action log.
#[derive(Debug, Error)]
pub enum LogError {
    /// The log file could not be opened.
    #[error("cannot open action log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error during CSV serialization or writing.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while flushing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// What happened to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Retained as the representative of its duplicate set
    Kept,
    /// Removed from disk
    Deleted,
    /// Deletion was attempted or planned but did not happen
    Failed,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kept => write!(f, "Kept"),
            Self::Deleted => write!(f, "Deleted"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// A single row in the action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub action: Action,
    pub path: String,
    pub hash: String,
}

impl LogRecord {
    fn new(timestamp: &str, action: Action, path: &Path, hash: String) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            action,
            path: escape_path(path).into_owned(),
            hash,
        }
    }

    /// Row for the retained copy.
    #[must_use]
    pub fn kept(timestamp: &str, path: &Path, hash: &str) -> Self {
        Self::new(timestamp, Action::Kept, path, hash.to_string())
    }

    /// Row for a removed duplicate.
    #[must_use]
    pub fn deleted(timestamp: &str, path: &Path, hash: &str) -> Self {
        Self::new(timestamp, Action::Deleted, path, hash.to_string())
    }

    /// Row for a duplicate that could not be removed.
    #[must_use]
    pub fn failed(timestamp: &str, path: &Path, hash: &str, error: &str) -> Self {
        Self::new(timestamp, Action::Failed, path, format!("{hash} ({error})"))
    }
}

/// Append-only CSV writer for [`LogRecord`]s.
pub struct ActionLog<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl ActionLog<File> {
    /// Open `path` for appending, creating it (and its parent directory) if
    /// needed. Writes the header when the file is new or empty.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the file cannot be created, opened, or the
    /// header cannot be written.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let open_err = |source| LogError::Open {
            path: path.to_path_buf(),
            source,
        };

        let needs_header = fs::metadata(path).map_or(true, |m| m.len() == 0);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;

        log::debug!(
            "Opened action log {} (new: {})",
            path.display(),
            needs_header
        );
        Self::from_writer(file, needs_header)
    }
}

impl<W: Write> ActionLog<W> {
    /// Wrap an arbitrary writer, optionally emitting the header first.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the header cannot be written.
    pub fn from_writer(writer: W, write_header: bool) -> Result<Self, LogError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        if write_header {
            writer.write_record(LOG_HEADER)?;
            writer.flush()?;
        }
        Ok(Self { writer, rows: 0 })
    }

    /// Append one row and flush it to the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if serialization or the flush fails.
    pub fn record(&mut self, record: &LogRecord) -> Result<(), LogError> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of rows appended through this handle (header excluded).
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if buffered data cannot be flushed.
    pub fn into_inner(self) -> Result<W, LogError> {
        self.writer
            .into_inner()
            .map_err(|e| LogError::Io(e.into_error()))
    }
}
