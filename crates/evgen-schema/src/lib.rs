//! # evgen-schema — Schema Resolution Pipeline
//!
//! Turns a set of event schema documents that point at each other into a set
//! of self-contained, inheritance-flattened schemas ready for code generation.
//!
//! ## Pipeline
//!
//! 1. [`store`] — enumerates documents with a glob pattern and loads them on
//!    demand, keyed by absolute [`DocumentPath`](evgen_core::DocumentPath).
//! 2. [`resolve`] — rewrites every `$ref` from "relative to the containing
//!    document" into an absolute key, and extracts the set of keys a tree
//!    touches.
//! 3. [`substitute`] — replaces every reference marker with the resolved
//!    content of the document it points at.
//! 4. [`merge`] — folds an `extends` base into the derived document's
//!    `properties` and `required`.
//! 5. [`compose`] — drives the above as a memoized depth-first traversal of
//!    the reference graph, rejecting cycles, and produces an
//!    [`EventCatalog`] keyed by event title.
//!
//! ## Crate Policy
//!
//! - Depends only on `evgen-core` internally.
//! - Every transform returns a new tree. Input trees are never mutated.
//! - Errors name the document being processed and, for references, the
//!   document that referenced it.

pub mod compose;
pub mod error;
pub mod merge;
pub mod resolve;
pub mod store;
pub mod substitute;

pub use compose::{ComposedEvent, Composer, EventCatalog};
pub use error::ComposeError;
pub use merge::merge_extends;
pub use resolve::{get_refs, resolve_reference_paths};
pub use store::{enumerate, DocumentSource, DocumentStore, FsSource, MemorySource};
pub use substitute::{substitute_refs, ResolutionMap};
