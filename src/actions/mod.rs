//! File actions module.
//!
//! This module provides functionality for:
//! - Permanent deletion of a single duplicate with typed errors
//! - Resolving duplicate sets: keep the first copy, delete the rest, and
//!   record every decision in the action log
//!
//! ```no_run
//! use duplicheck::actions::delete_file;
//! use std::path::Path;
//!
//! match delete_file(Path::new("/path/to/duplicate.txt")) {
//!     Ok(result) => println!("Deleted: {} ({} bytes)", result.path.display(), result.size),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

pub mod delete;
pub mod resolve;

// Re-export commonly used types
pub use delete::{delete_file, DeleteError, DeleteResult};
pub use resolve::{ResolveSummary, Resolver};
