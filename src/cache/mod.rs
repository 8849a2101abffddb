//! Hash caching module for DupliCheck.
//!
//! This module provides persistent storage for file hashes to speed up
//! subsequent scans by avoiding re-hashing of unchanged files.
//!
//! # Architecture
//!
//! The caching system is split into two components:
//!
//! * [`store`]: Loads and saves the cache as a single JSON document.
//! * [`entry`]: Defines the typed records stored in the cache.
//!
//! # Cache Invalidation
//!
//! Entries are keyed by file path and validated against the file's current
//! [`FileSignature`](crate::scanner::FileSignature) (modification time and
//! size). If either changed, the entry is stale and the file is re-hashed.
//!
//! The cache is rebuilt from scratch on every run: only files observed in the
//! current run are written back, so entries for deleted files disappear.

pub mod entry;
pub mod store;

pub use entry::{CacheEntry, SignatureCache};
pub use store::{CacheError, CacheResult, HashCache};
