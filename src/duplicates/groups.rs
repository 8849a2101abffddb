//! Hash grouping and duplicate group management.
//!
//! # Overview
//!
//! [`HashGroups`] maps a content hash to the paths sharing it. Both the order
//! of groups (first time a hash was seen) and the order of paths inside a
//! group (enumeration order) are preserved, because the first path of a group
//! is the copy that is kept.
//!
//! # Example
//!
//! ```
//! use duplicheck::duplicates::HashGroups;
//! use std::path::PathBuf;
//!
//! let mut groups = HashGroups::new();
//! groups.insert([1; 32], PathBuf::from("/a.txt"));
//! groups.insert([2; 32], PathBuf::from("/c.txt"));
//! groups.insert([1; 32], PathBuf::from("/b.txt"));
//!
//! let duplicates = groups.into_duplicates();
//! assert_eq!(duplicates.len(), 1);
//! assert_eq!(duplicates[0].kept(), &PathBuf::from("/a.txt"));
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, Hash};

/// Files sharing one content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// SHA-256 of the shared content
    pub hash: Hash,
    /// Paths in enumeration order; never empty
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group from a hash and its files.
    #[must_use]
    pub fn new(hash: Hash, files: Vec<PathBuf>) -> Self {
        Self { hash, files }
    }

    /// The file that is retained: the first one enumerated.
    ///
    /// # Panics
    ///
    /// Panics if the group has no files, which [`HashGroups`] never produces.
    #[must_use]
    pub fn kept(&self) -> &PathBuf {
        &self.files[0]
    }

    /// Every file except the kept one.
    #[must_use]
    pub fn duplicates(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Whether this group is a duplicate set (2+ files).
    #[must_use]
    pub fn is_duplicate_set(&self) -> bool {
        self.files.len() > 1
    }

    /// Number of files in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Hash rendered as hex.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}

/// Insertion-ordered `hash -> paths` map.
#[derive(Debug, Clone, Default)]
pub struct HashGroups {
    index: HashMap<Hash, usize>,
    groups: Vec<DuplicateGroup>,
}

impl HashGroups {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the group for `hash`, creating the group if new.
    pub fn insert(&mut self, hash: Hash, path: PathBuf) {
        match self.index.get(&hash) {
            Some(&i) => self.groups[i].files.push(path),
            None => {
                self.index.insert(hash, self.groups.len());
                self.groups.push(DuplicateGroup::new(hash, vec![path]));
            }
        }
    }

    /// Number of distinct hashes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no file has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of paths across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Iterate groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter()
    }

    /// Keep only the duplicate sets, in first-seen order.
    #[must_use]
    pub fn into_duplicates(self) -> Vec<DuplicateGroup> {
        self.groups
            .into_iter()
            .filter(DuplicateGroup::is_duplicate_set)
            .collect()
    }
}
