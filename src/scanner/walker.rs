//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! [`Walker`] enumerates every regular file below a root directory. The walk
//! is single-threaded and entries inside each directory are visited in file
//! name order, so the sequence of paths is deterministic. That order decides
//! which copy of a duplicate set survives.
//!
//! # Error policy
//!
//! - An invalid root (missing, not a directory, unreadable) is fatal.
//! - Failures below the root (an unreadable subdirectory, an entry that
//!   vanished mid-walk) are logged and skipped.
//!
//! Symbolic links are not followed and are never yielded.
//!
//! # Example
//!
//! ```no_run
//! use duplicheck::scanner::Walker;
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"));
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(path) => println!("{}", path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::ScanError;

/// Ordered, recursive file enumerator.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
}

impl Walker {
    /// Create a new walker for the given root directory.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Check that the root exists and is a readable directory.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] if the root does not exist
    /// - [`ScanError::NotADirectory`] if it is not a directory
    /// - [`ScanError::PermissionDenied`] / [`ScanError::Io`] if it cannot be stat'ed
    pub fn validate_root(&self) -> Result<(), ScanError> {
        let metadata =
            std::fs::metadata(&self.root).map_err(|e| self.io_error(self.root.clone(), e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Walk the directory tree, yielding regular file paths.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. The root itself is never yielded.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        self.entries()
            .filter_map(move |item| self.classify(item).map(|r| r.map_err(|(_, e)| e)))
    }

    /// Collect every regular file below the root, in enumeration order.
    ///
    /// # Errors
    ///
    /// Returns the first error that concerns the root itself. Errors deeper in
    /// the tree are logged at warn level and skipped.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>, ScanError> {
        self.validate_root()?;

        let mut files = Vec::new();
        for item in self.entries() {
            match self.classify(item) {
                Some(Ok(path)) => files.push(path),
                Some(Err((0, e))) => return Err(e),
                Some(Err((depth, e))) => {
                    log::warn!("Skipping unreadable entry at depth {}: {}", depth, e);
                }
                None => {}
            }
        }

        log::debug!(
            "Enumerated {} files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    fn entries(&self) -> walkdir::IntoIter {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
    }

    /// Map one walkdir item to a file path, a depth-tagged error, or nothing.
    fn classify(
        &self,
        item: walkdir::Result<DirEntry>,
    ) -> Option<Result<PathBuf, (usize, ScanError)>> {
        match item {
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_file() {
                    Some(Ok(entry.into_path()))
                } else {
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                    }
                    None
                }
            }
            Err(e) => {
                let depth = e.depth();
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf);
                let err = match e.into_io_error() {
                    Some(io_err) => self.io_error(path, io_err),
                    None => ScanError::Io {
                        path,
                        source: io::Error::other("filesystem loop detected"),
                    },
                };
                Some(Err((depth, err)))
            }
        }
    }

    fn io_error(&self, path: PathBuf, error: io::Error) -> ScanError {
        match error.kind() {
            io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path),
            io::ErrorKind::NotFound => ScanError::NotFound(path),
            _ => ScanError::Io {
                path,
                source: error,
            },
        }
    }
}
