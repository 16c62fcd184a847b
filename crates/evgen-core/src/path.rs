//! # Document Paths — Absolute, Normalized Store Keys
//!
//! A schema document is identified by the absolute path of the file it was
//! read from. References inside a document are written relative to the
//! document's own directory and are rewritten into this absolute form before
//! any lookup happens.
//!
//! ## Invariant
//!
//! A `DocumentPath` always starts with `/`, uses `/` separators, and contains
//! no `.` or `..` segments. Path equality therefore implies document identity.
//!
//! Normalization is purely lexical. Symlinks are not followed.

use std::borrow::Borrow;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Absolute, lexically normalized path of a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Wrap an absolute path string, normalizing it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RelativePath`] if `path` does not start with `/`.
    pub fn new(path: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = path.as_ref();
        if !raw.starts_with('/') {
            return Err(CoreError::RelativePath(raw.to_string()));
        }
        Ok(Self(normalize(raw)))
    }

    /// Build a key from a filesystem path, resolving relative paths against
    /// the current working directory.
    pub fn from_fs(path: &Path) -> Result<Self, CoreError> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        let raw = absolute
            .to_str()
            .ok_or_else(|| CoreError::NonUtf8Path(absolute.clone()))?;
        Self::new(raw)
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The path as a filesystem path, for reading the document.
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Directory containing the document. References inside the document are
    /// relative to this directory.
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "/",
            Some(idx) => &self.0[..idx],
        }
    }

    /// Final path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Extension of the final segment, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Hash and Eq derive from the inner `String`, so lookups by `&str` agree.
impl Borrow<str> for DocumentPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Join a reference onto the directory of the document that contains it.
///
/// The join is syntactic: a reference that already starts with `/` is still
/// appended below `base_dir` (`/a` + `/x.yml` gives `/a/x.yml`). The result is
/// normalized with [`normalize`].
pub fn join_reference(base_dir: &str, reference: &str) -> String {
    if base_dir.is_empty() {
        return normalize(reference);
    }
    normalize(&format!("{base_dir}/{reference}"))
}

/// Lexically normalize a `/`-separated path.
///
/// Drops empty and `.` segments and folds `..` into its parent. A leading
/// `..` is discarded for absolute paths and kept for relative ones.
pub fn normalize(raw: &str) -> String {
    let absolute = raw.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if absolute => {}
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
