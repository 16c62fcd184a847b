//! # Reference Substitution
//!
//! Dereferences reference markers. Each marker whose target has an entry in
//! the resolution map is replaced wholesale by that entry: the marker's
//! sibling keys are dropped and nothing is merged into the resolved content.
//! Markers without an entry are kept and their siblings are still searched.
//!
//! Resolution and substitution are companions: one rewrites the pointer, the
//! other follows it. If the map covers every target reported by
//! [`get_refs`](crate::get_refs), the output contains no markers.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use evgen_core::{DocumentPath, NodeKind, SchemaTree};
use serde_json::{Map, Value};

/// Fully-resolved document content keyed by absolute document path.
pub type ResolutionMap = HashMap<DocumentPath, SchemaTree>;

/// Return a copy of `tree` with every covered reference marker replaced by
/// its resolved value.
pub fn substitute_refs<K>(tree: &SchemaTree, resolved: &HashMap<K, SchemaTree>) -> SchemaTree
where
    K: Borrow<str> + Eq + Hash,
{
    match NodeKind::classify(tree) {
        NodeKind::Reference { target, node } => match resolved.get(target) {
            Some(value) => value.clone(),
            None => {
                tracing::trace!(reference = target, "no resolution for reference; marker kept");
                Value::Object(substitute_map(node, resolved))
            }
        },
        NodeKind::Extends(map) | NodeKind::Map(map) => Value::Object(substitute_map(map, resolved)),
        NodeKind::Sequence(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_refs(item, resolved))
                .collect(),
        ),
        NodeKind::Scalar(value) => value.clone(),
    }
}

fn substitute_map<K>(map: &Map<String, Value>, resolved: &HashMap<K, SchemaTree>) -> Map<String, Value>
where
    K: Borrow<str> + Eq + Hash,
{
    map.iter()
        .map(|(key, value)| (key.clone(), substitute_refs(value, resolved)))
        .collect()
}
