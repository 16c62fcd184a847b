//! # Codegen and Compile Errors

use std::path::PathBuf;

use evgen_schema::ComposeError;
use thiserror::Error;

/// Error while turning a composed catalog into module text.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The title contains no characters usable in an identifier.
    #[error("event title '{title}' yields no identifier characters")]
    InvalidIdentifier {
        /// Offending title.
        title: String,
    },

    /// Two titles map to the same generated identifier.
    #[error("event titles '{first}' and '{second}' both generate identifier '{identifier}'")]
    DuplicateIdentifier {
        /// Generated name both titles produce.
        identifier: String,
        /// First title, in title order.
        first: String,
        /// Second title.
        second: String,
    },
}

/// Error from the compile entry point. Carries the first fatal failure.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Enumeration, loading, resolution, or composition failed.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Module rendering failed.
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// The existing output file could not be read for comparison.
    #[error("failed to read existing output {}: {reason}", path.display())]
    OutputRead {
        /// Output path.
        path: PathBuf,
        /// IO diagnostic.
        reason: String,
    },

    /// The output file could not be written.
    #[error("failed to write output {}: {reason}", path.display())]
    OutputWrite {
        /// Destination path.
        path: PathBuf,
        /// IO diagnostic.
        reason: String,
    },
}
