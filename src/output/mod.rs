//! Persistent output of a cleanup run.
//!
//! - [`action_log`]: the append-only CSV log of kept, deleted and failed files

pub mod action_log;

// Re-export main types
pub use action_log::{Action, ActionLog, LogError, LogRecord, LOG_HEADER, TIMESTAMP_FORMAT};
