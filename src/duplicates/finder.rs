//! Hashing and grouping of enumerated files.
//!
//! # Overview
//!
//! For every path, in enumeration order, [`DuplicateFinder`]:
//! 1. Stats the file; a file that vanished is skipped silently
//! 2. Reuses the cached hash if the stored signature still matches
//! 3. Otherwise streams the content through SHA-256
//! 4. Records the fresh cache entry and appends the path to its hash group
//!
//! Per-file failures are returned as [`FileOutcome::Failed`] and excluded from
//! both the groups and the new cache; the scan continues.
//!
//! With `hash_threads > 1` the per-file work runs on a bounded rayon pool.
//! Outcomes are collected in input order before grouping, so the result is
//! identical to a sequential run.
//!
//! # Example
//!
//! ```no_run
//! use duplicheck::cache::SignatureCache;
//! use duplicheck::duplicates::DuplicateFinder;
//! use duplicheck::scanner::Walker;
//! use std::path::Path;
//!
//! let files = Walker::new(Path::new(".")).collect_files().unwrap();
//! let finder = DuplicateFinder::with_defaults();
//! let outcome = finder.hash_and_group(&files, &SignatureCache::new()).unwrap();
//!
//! println!("{} duplicate sets", outcome.groups.into_duplicates().len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use thiserror::Error;

use super::HashGroups;
use crate::cache::{CacheEntry, SignatureCache};
use crate::progress::{ProgressCallback, PHASE_HASHING};
use crate::scanner::{signature_of, HashError, Hasher};

/// Configuration for the hashing phase.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing threads. 1 hashes on the calling thread.
    pub hash_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("hash_threads", &self.hash_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            hash_threads: 1,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of hashing threads (minimum 1).
    #[must_use]
    pub fn with_hash_threads(mut self, threads: usize) -> Self {
        self.hash_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Result of processing a single enumerated path.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was hashed, from the cache or from its content.
    Hashed {
        path: PathBuf,
        entry: CacheEntry,
        from_cache: bool,
    },
    /// The file disappeared before it could be stat'ed.
    Vanished(PathBuf),
    /// The file could not be stat'ed or read.
    Failed(HashError),
}

/// Counters for the hashing phase.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Paths handed to the finder
    pub total_files: usize,
    /// Files whose hash came from the cache
    pub cache_hits: usize,
    /// Files whose content was read
    pub cache_misses: usize,
    /// Files that disappeared before hashing
    pub vanished: usize,
    /// Files that could not be hashed
    pub failures: Vec<HashError>,
    /// Wall time spent in the phase
    pub elapsed: Duration,
}

impl HashStats {
    /// Number of files that made it into a group.
    #[must_use]
    pub fn hashed(&self) -> usize {
        self.cache_hits + self.cache_misses
    }
}

/// Output of [`DuplicateFinder::hash_and_group`].
#[derive(Debug)]
pub struct HashOutcome {
    /// Every successfully hashed path, grouped by hash
    pub groups: HashGroups,
    /// Fresh cache covering exactly the hashed paths
    pub cache: SignatureCache,
    /// Phase counters
    pub stats: HashStats,
}

/// Errors that abort the hashing phase as a whole.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The hashing worker pool could not be created.
    #[error("failed to start {threads} hashing threads: {source}")]
    ThreadPool {
        threads: usize,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

/// Hashes files (cache-aware) and groups them by content.
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create a sequential finder without progress reporting.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The content hasher used for cache misses.
    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Hash one file, consulting `previous` first.
    pub fn process_file(&self, path: &Path, previous: &SignatureCache) -> FileOutcome {
        let signature = match signature_of(path) {
            Ok(Some(sig)) => sig,
            Ok(None) => return FileOutcome::Vanished(path.to_path_buf()),
            Err(e) => return FileOutcome::Failed(e),
        };

        if let Some(hash) = previous.lookup(path, &signature) {
            log::trace!("Cache hit: {}", path.display());
            return FileOutcome::Hashed {
                path: path.to_path_buf(),
                entry: CacheEntry::new(signature, hash),
                from_cache: true,
            };
        }

        match self.hasher.hash_file(path) {
            Ok(hash) => FileOutcome::Hashed {
                path: path.to_path_buf(),
                entry: CacheEntry::new(signature, hash),
                from_cache: false,
            },
            Err(e) => FileOutcome::Failed(e),
        }
    }

    /// Hash every path and group the results.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ThreadPool`] if a multi-threaded pool was
    /// requested and could not be built. Per-file failures never error.
    pub fn hash_and_group(
        &self,
        paths: &[PathBuf],
        previous: &SignatureCache,
    ) -> Result<HashOutcome, FinderError> {
        let start = Instant::now();
        let progress = self.config.progress_callback.as_deref();
        if let Some(cb) = progress {
            cb.on_phase_start(PHASE_HASHING, paths.len());
        }

        let done = AtomicUsize::new(0);
        let run_one = |path: &PathBuf| {
            let outcome = self.process_file(path, previous);
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(cb) = progress {
                cb.on_progress(current, &path.to_string_lossy());
            }
            outcome
        };

        let outcomes: Vec<FileOutcome> = if self.config.hash_threads > 1 {
            let threads = self.config.hash_threads;
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|source| FinderError::ThreadPool { threads, source })?;
            log::debug!("Hashing {} files on {} threads", paths.len(), threads);
            pool.install(|| paths.par_iter().map(run_one).collect::<Vec<_>>())
        } else {
            paths.iter().map(run_one).collect()
        };

        if let Some(cb) = progress {
            cb.on_phase_end(PHASE_HASHING);
        }

        let mut outcome = Self::fold_outcomes(outcomes);
        outcome.stats.total_files = paths.len();
        outcome.stats.elapsed = start.elapsed();

        log::debug!(
            "Hashing finished: {} cache hits, {} misses, {} vanished, {} failed",
            outcome.stats.cache_hits,
            outcome.stats.cache_misses,
            outcome.stats.vanished,
            outcome.stats.failures.len()
        );
        Ok(outcome)
    }

    /// Sequentially merge ordered per-file outcomes into groups and cache.
    fn fold_outcomes(outcomes: Vec<FileOutcome>) -> HashOutcome {
        let mut groups = HashGroups::new();
        let mut cache = SignatureCache::new();
        let mut stats = HashStats::default();

        for outcome in outcomes {
            match outcome {
                FileOutcome::Hashed {
                    path,
                    entry,
                    from_cache,
                } => {
                    if from_cache {
                        stats.cache_hits += 1;
                    } else {
                        stats.cache_misses += 1;
                    }
                    cache.insert(&path, entry);
                    groups.insert(entry.hash, path);
                }
                FileOutcome::Vanished(path) => {
                    log::debug!("File vanished before hashing: {}", path.display());
                    stats.vanished += 1;
                }
                FileOutcome::Failed(e) => {
                    log::warn!("Error hashing {}: {}", e.path().display(), e);
                    stats.failures.push(e);
                }
            }
        }

        HashOutcome {
            groups,
            cache,
            stats,
        }
    }
}
