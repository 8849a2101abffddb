//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Cache-aware content hashing of enumerated files
//! - Grouping paths by content hash in discovery order
//! - Selecting duplicate sets (groups with 2+ files)

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateFinder, FileOutcome, FinderConfig, FinderError, HashOutcome, HashStats,
};
pub use groups::{DuplicateGroup, HashGroups};
