//! Cache entry definitions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::scanner::{hash_to_hex, hex_to_hash, path_key, FileSignature, Hash};

/// Represents a single file entry in the hash cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Signature of the file when `hash` was computed
    pub signature: FileSignature,
    /// SHA-256 of the file content, stored as hex
    #[serde(with = "hex_hash")]
    pub hash: Hash,
}

impl CacheEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(signature: FileSignature, hash: Hash) -> Self {
        Self { signature, hash }
    }

    /// Whether this entry is still valid for a file with `current` signature.
    #[must_use]
    pub fn matches(&self, current: &FileSignature) -> bool {
        self.signature == *current
    }
}

/// Path-keyed collection of [`CacheEntry`] values.
///
/// Keys are [`path_key`] renderings, so distinct paths never share one. A `BTreeMap` keeps the
/// serialized document sorted, so identical scans produce identical files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl SignatureCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry recorded for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&CacheEntry> {
        path_key(path).and_then(|key| self.entries.get(key.as_ref()))
    }

    /// Cached hash for `path` if its stored signature equals `current`.
    #[must_use]
    pub fn lookup(&self, path: &Path, current: &FileSignature) -> Option<Hash> {
        self.get(path)
            .filter(|entry| entry.matches(current))
            .map(|entry| entry.hash)
    }

    /// Record (or replace) the entry for `path`.
    ///
    /// Paths without a unique text form are not cached; they are re-hashed on
    /// every run.
    pub fn insert(&mut self, path: &Path, entry: CacheEntry) {
        match path_key(path) {
            Some(key) => {
                self.entries.insert(key.into_owned(), entry);
            }
            None => log::debug!("Not caching {}: no unique key", path.display()),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(path, entry)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

mod hex_hash {
    use super::{hash_to_hex, hex_to_hash, Deserialize, Deserializer, Hash, Serializer};

    pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hash_to_hex(hash))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
        let hex = String::deserialize(deserializer)?;
        hex_to_hash(&hex)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid SHA-256 hex digest: {hex}")))
    }
}
