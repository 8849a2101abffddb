//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Ordered directory walking using walkdir
//! - Content hashing with SHA-256 (streamed in 64 KiB chunks)
//! - Cheap `(mtime, size)` file signatures used by the hash cache
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: SHA-256 file hashing (streaming)
//! - [`path_utils`]: collision-free text forms of paths
//!
//! # Example
//!
//! ```no_run
//! use duplicheck::scanner::{Hasher, Walker};
//! use std::path::Path;
//!
//! let files = Walker::new(Path::new(".")).collect_files().unwrap();
//! let hasher = Hasher::new();
//! for path in &files {
//!     match hasher.hash_file(path) {
//!         Ok(hash) => println!("{}  {}", duplicheck::scanner::hash_to_hex(&hash), path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{hash_to_hex, hex_to_hash, Hash, Hasher, CHUNK_SIZE};
pub use path_utils::{escape_path, path_key};
pub use walker::Walker;

/// Observed `(modification time, size)` of a file.
///
/// Used as a fast proxy for "content unchanged since it was last hashed".
/// Two different contents written within the same mtime tick with the same
/// size are indistinguishable; that approximation is accepted.
///
/// Serialized as a two element array `[mtime_ns, size]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, u64)", into = "(i64, u64)")]
pub struct FileSignature {
    /// Modification time in nanoseconds relative to the Unix epoch
    pub modified: i64,
    /// File size in bytes
    pub size: u64,
}

impl FileSignature {
    /// Create a signature from a modification time and a size.
    #[must_use]
    pub fn new(modified: SystemTime, size: u64) -> Self {
        Self {
            modified: system_time_to_nanos(modified),
            size,
        }
    }
}

impl From<(i64, u64)> for FileSignature {
    fn from((modified, size): (i64, u64)) -> Self {
        Self { modified, size }
    }
}

impl From<FileSignature> for (i64, u64) {
    fn from(sig: FileSignature) -> Self {
        (sig.modified, sig.size)
    }
}

fn system_time_to_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}

/// Stat `path` and return its current signature.
///
/// Returns `Ok(None)` when the file no longer exists; a file removed between
/// enumeration and hashing is not an error.
///
/// # Errors
///
/// Returns [`HashError`] for any other stat failure (permission, I/O).
pub fn signature_of(path: &Path) -> Result<Option<FileSignature>, HashError> {
    match std::fs::metadata(path) {
        Ok(metadata) => {
            let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
            Ok(Some(FileSignature::new(modified, metadata.len())))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(HashError::from_io(path, e)),
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
