//! # Error Types — Core Failures
//!
//! Errors raised while parsing schema markup or constructing document paths.
//! Higher layers wrap these with the document they were processing.

use std::path::PathBuf;

use thiserror::Error;

/// Error in the foundational layer.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Schema markup could not be parsed into a tree.
    #[error("invalid {format}: {reason}")]
    Parse {
        /// Markup the text was parsed as (`YAML` or `JSON`).
        format: &'static str,
        /// Parser diagnostic.
        reason: String,
    },

    /// A document path was expected to be absolute.
    #[error("document path must be absolute: '{0}'")]
    RelativePath(String),

    /// A filesystem path is not valid UTF-8 and cannot be used as a key.
    #[error("document path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// IO error while absolutizing a path.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
