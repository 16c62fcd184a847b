//! # evgen-core — Foundational Types for the Event Schema Compiler
//!
//! This crate is the bedrock of the evgen workspace. It defines the value
//! model every other crate operates on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One tree type.** A parsed schema document is a [`SchemaTree`]
//!    (`serde_json::Value`). YAML and JSON documents both lower into it, so
//!    reference handling never cares which markup a document was written in.
//!
//! 2. **Classify before recursing.** [`NodeKind::classify`] tags every node as
//!    a reference marker, an `extends` carrier, a plain map, a sequence, or a
//!    scalar. Traversals `match` on the tag instead of probing reserved keys
//!    ad hoc, so every traversal is exhaustive.
//!
//! 3. **`DocumentPath` newtype.** Store keys are absolute, lexically
//!    normalized paths. Two spellings of the same file (`a/./b.yml`,
//!    `a/c/../b.yml`) compare equal once wrapped.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `evgen-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod parse;
pub mod path;
pub mod tree;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use parse::{parse_document, DocumentFormat};
pub use path::{join_reference, normalize, DocumentPath};
pub use tree::{
    reference_target, NodeKind, SchemaTree, ADDITIONAL_PROPERTIES_KEY, EXTENDS_KEY,
    PROPERTIES_KEY, REF_KEY, REQUIRED_KEY, TITLE_KEY,
};
