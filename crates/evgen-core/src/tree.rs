//! # Schema Tree — Value Model and Node Classification
//!
//! A schema document parses into a tree of maps, sequences, and scalars.
//! Two reserved keys trigger special handling wherever they appear:
//!
//! - `$ref` — the map is a *reference marker* standing in for the content of
//!   another document. Its value is a path string.
//! - `extends` — the map inherits `properties` and `required` from the
//!   document the `extends` marker points at.
//!
//! [`NodeKind::classify`] decides which of these a node is exactly once, so
//! recursive transforms can `match` exhaustively instead of checking key
//! presence at every call site.

use serde_json::{Map, Value};

/// A parsed schema document or any subtree of one.
pub type SchemaTree = Value;

/// Reference marker key.
pub const REF_KEY: &str = "$ref";
/// Inheritance key.
pub const EXTENDS_KEY: &str = "extends";
/// Event display name key.
pub const TITLE_KEY: &str = "title";
/// Field schema map key.
pub const PROPERTIES_KEY: &str = "properties";
/// Required field list key.
pub const REQUIRED_KEY: &str = "required";
/// Closed-object flag key.
pub const ADDITIONAL_PROPERTIES_KEY: &str = "additionalProperties";

/// Classification of a single tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// A map carrying a string `$ref`. `node` is the whole map, siblings included.
    Reference {
        /// Path the marker points at.
        target: &'a str,
        /// The marker map.
        node: &'a Map<String, Value>,
    },
    /// A map carrying `extends` (and no `$ref`).
    Extends(&'a Map<String, Value>),
    /// Any other map.
    Map(&'a Map<String, Value>),
    /// An ordered list.
    Sequence(&'a [Value]),
    /// String, number, boolean, or null.
    Scalar(&'a Value),
}

impl<'a> NodeKind<'a> {
    /// Classify `node`.
    ///
    /// A `$ref` whose value is not a string does not make a marker; the map is
    /// classified by its remaining keys.
    pub fn classify(node: &'a Value) -> Self {
        match node {
            Value::Object(map) => match map.get(REF_KEY) {
                Some(Value::String(target)) => NodeKind::Reference { target, node: map },
                _ if map.contains_key(EXTENDS_KEY) => NodeKind::Extends(map),
                _ => NodeKind::Map(map),
            },
            Value::Array(items) => NodeKind::Sequence(items),
            scalar => NodeKind::Scalar(scalar),
        }
    }

    /// Whether this node is a reference marker.
    pub fn is_reference(&self) -> bool {
        matches!(self, NodeKind::Reference { .. })
    }
}

/// The `$ref` target of `node`, if it is a reference marker.
pub fn reference_target(node: &Value) -> Option<&str> {
    match NodeKind::classify(node) {
        NodeKind::Reference { target, .. } => Some(target),
        _ => None,
    }
}
