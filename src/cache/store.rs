//! JSON-file backed hash cache.
//!
//! The whole [`SignatureCache`] is read once at start-up and written back
//! wholesale after hashing. A damaged cache only costs re-hashing time, so
//! [`HashCache::load`] degrades to an empty cache instead of failing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::SignatureCache;

/// Errors raised by cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("cache I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cache file exists but is not a valid cache document.
    #[error("malformed cache file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The in-memory cache could not be serialized.
    #[error("failed to serialize cache: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Persistent cache for file hashes stored as a JSON file.
#[derive(Debug, Clone)]
pub struct HashCache {
    path: PathBuf,
}

impl HashCache {
    /// Use the cache file at `path`. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache, strictly.
    ///
    /// A missing file yields an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file exists but cannot be read and
    /// [`CacheError::Malformed`] if it cannot be parsed.
    pub fn try_load(&self) -> CacheResult<SignatureCache> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No cache at {}, starting empty", self.path.display());
                return Ok(SignatureCache::new());
            }
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| CacheError::Malformed {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Read the cache, treating any failure as an empty cache.
    pub fn load(&self) -> SignatureCache {
        match self.try_load() {
            Ok(cache) => {
                log::debug!(
                    "Loaded {} cache entries from {}",
                    cache.len(),
                    self.path.display()
                );
                cache
            }
            Err(e) => {
                log::warn!("Ignoring unusable hash cache: {}", e);
                SignatureCache::new()
            }
        }
    }

    /// Replace the cache file with `cache`.
    ///
    /// The parent directory is created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if serialization or writing fails.
    pub fn save(&self, cache: &SignatureCache) -> CacheResult<()> {
        let json = serde_json::to_string(cache).map_err(CacheError::Serialize)?;

        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, json).map_err(io_err)?;

        log::debug!(
            "Saved {} cache entries to {}",
            cache.len(),
            self.path.display()
        );
        Ok(())
    }
}
