//! Text forms of paths for the hash cache and the action log.
//!
//! Both files store paths as strings, and two different paths must never end
//! up as the same string. A lossy conversion would map every invalid byte to
//! U+FFFD, so `f\xfd` and `f\xfe` would collide.
//!
//! On Unix, [`path_key`] leaves ordinary UTF-8 paths untouched. Otherwise it
//! writes each backslash as `\\` and each byte that is not valid UTF-8 as
//! `\xNN`. The original bytes can always be recovered from the result.
//!
//! # Example
//!
//! ```
//! use duplicheck::scanner::path_utils::escape_path;
//! use std::path::Path;
//!
//! assert_eq!(escape_path(Path::new("/photos/a.jpg")), "/photos/a.jpg");
//! ```

use std::borrow::Cow;
use std::path::Path;

/// Unique text form of `path`, or `None` when the platform has none.
///
/// On Unix every path has one. Elsewhere only paths that are valid Unicode
/// do.
#[must_use]
pub fn path_key(path: &Path) -> Option<Cow<'_, str>> {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Some(escape_bytes(path.as_os_str().as_bytes()))
    }

    #[cfg(not(unix))]
    {
        path.to_str().map(Cow::Borrowed)
    }
}

/// Text form of `path` for the action log.
///
/// Same as [`path_key`], falling back to a lossy rendering only where no
/// unique form exists.
#[must_use]
pub fn escape_path(path: &Path) -> Cow<'_, str> {
    path_key(path).unwrap_or_else(|| path.to_string_lossy())
}

#[cfg(unix)]
fn escape_bytes(bytes: &[u8]) -> Cow<'_, str> {
    use std::fmt::Write;

    if let Ok(text) = std::str::from_utf8(bytes) {
        if !text.contains('\\') {
            return Cow::Borrowed(text);
        }
    }

    let mut out = String::with_capacity(bytes.len() + 8);
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '\\' {
                out.push_str("\\\\");
            } else {
                out.push(c);
            }
        }
        for byte in chunk.invalid() {
            let _ = write!(out, "\\x{byte:02x}");
        }
    }
    Cow::Owned(out)
}
