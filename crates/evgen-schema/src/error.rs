//! # Composition Errors
//!
//! Every failure during enumeration, loading, resolution, or composition is
//! fatal for the whole compilation. Variants carry the paths needed to find
//! the offending document without re-running with extra logging.

use evgen_core::{CoreError, DocumentPath};
use thiserror::Error;

/// Error while building the event catalog.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// The glob pattern was malformed.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Glob {
        /// Pattern as given.
        pattern: String,
        /// Glob diagnostic.
        reason: String,
    },

    /// The glob pattern matched no documents.
    #[error("no schema documents matched '{pattern}'")]
    NoDocuments {
        /// Pattern as given.
        pattern: String,
    },

    /// A document was requested that was never enumerated.
    #[error("document {path} is not among the enumerated schema documents")]
    NotEnumerated {
        /// Requested path.
        path: DocumentPath,
    },

    /// The document could not be read.
    #[error("failed to read {path}: {reason}")]
    Load {
        /// Document path.
        path: DocumentPath,
        /// IO diagnostic.
        reason: String,
    },

    /// The document text could not be parsed.
    #[error("failed to parse {path}: {cause}")]
    Parse {
        /// Document path.
        path: DocumentPath,
        /// Parser failure.
        #[source]
        cause: CoreError,
    },

    /// A `$ref` could not be turned into an absolute document key.
    #[error("invalid reference '{reference}' in {referrer}: {cause}")]
    InvalidReference {
        /// Document containing the reference.
        referrer: DocumentPath,
        /// Reference value after resolution.
        reference: String,
        /// Path failure.
        #[source]
        cause: CoreError,
    },

    /// A `$ref` points at a document that was not enumerated.
    #[error("unresolved reference: {referrer} references {target}, which is not an enumerated schema document")]
    UnresolvedReference {
        /// Document containing the reference.
        referrer: DocumentPath,
        /// Missing target.
        target: DocumentPath,
    },

    /// A document transitively references itself.
    #[error("reference cycle detected: {}", format_cycle(.cycle))]
    ReferenceCycle {
        /// The cycle, starting and ending at the same document.
        cycle: Vec<DocumentPath>,
    },

    /// The `extends` value is not something that can be merged.
    #[error("invalid extends in {path}: {reason}")]
    InvalidExtends {
        /// Derived document.
        path: DocumentPath,
        /// What was wrong.
        reason: String,
    },

    /// The composed document has no string `title`.
    #[error("schema document {path} has no string 'title'")]
    MissingTitle {
        /// Document path.
        path: DocumentPath,
    },

    /// Two documents declare the same `title`.
    #[error("duplicate event title '{title}' declared by {first} and {second}")]
    DuplicateTitle {
        /// The shared title.
        title: String,
        /// First declaring document (in path order).
        first: DocumentPath,
        /// Second declaring document.
        second: DocumentPath,
    },
}

fn format_cycle(cycle: &[DocumentPath]) -> String {
    cycle
        .iter()
        .map(DocumentPath::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
