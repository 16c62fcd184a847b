//! # Reference Resolution
//!
//! Rewrites reference markers so their `$ref` is an absolute document key,
//! and extracts the set of keys a tree references.
//!
//! A `$ref` is written relative to the directory of the document containing
//! it. [`resolve_reference_paths`] joins it onto that directory; after that
//! the value can be used directly as a [`DocumentStore`](crate::DocumentStore)
//! key. The join is syntactic (see [`evgen_core::join_reference`]).
//!
//! Both functions recurse through map values and sequence elements alike.
//! A marker's sibling keys are recursed into as well, so a marker nested next
//! to another marker is still found.

use std::collections::BTreeSet;

use evgen_core::{join_reference, NodeKind, SchemaTree, REF_KEY};
use serde_json::{Map, Value};

/// Return a copy of `tree` with every `$ref` joined onto `base_dir`.
///
/// Only `$ref` string values change. Every other key, nesting level, and
/// sequence order is preserved.
pub fn resolve_reference_paths(base_dir: &str, tree: &SchemaTree) -> SchemaTree {
    match NodeKind::classify(tree) {
        NodeKind::Reference { target, node } => {
            let mut out = resolve_map(base_dir, node);
            out.insert(
                REF_KEY.to_string(),
                Value::String(join_reference(base_dir, target)),
            );
            Value::Object(out)
        }
        NodeKind::Extends(map) | NodeKind::Map(map) => Value::Object(resolve_map(base_dir, map)),
        NodeKind::Sequence(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_reference_paths(base_dir, item))
                .collect(),
        ),
        NodeKind::Scalar(value) => value.clone(),
    }
}

fn resolve_map(base_dir: &str, map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), resolve_reference_paths(base_dir, value)))
        .collect()
}

/// Collect the `$ref` value of every reference marker in `tree`.
///
/// Works on resolved and unresolved trees alike; it reports whatever the
/// markers currently hold. Duplicates collapse.
pub fn get_refs(tree: &SchemaTree) -> BTreeSet<String> {
    let mut refs = BTreeSet::new();
    collect_refs(tree, &mut refs);
    refs
}

fn collect_refs(tree: &SchemaTree, refs: &mut BTreeSet<String>) {
    match NodeKind::classify(tree) {
        NodeKind::Reference { target, node } => {
            refs.insert(target.to_string());
            for (key, value) in node {
                if key != REF_KEY {
                    collect_refs(value, refs);
                }
            }
        }
        NodeKind::Extends(map) | NodeKind::Map(map) => {
            for value in map.values() {
                collect_refs(value, refs);
            }
        }
        NodeKind::Sequence(items) => {
            for item in items {
                collect_refs(item, refs);
            }
        }
        NodeKind::Scalar(_) => {}
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Trees whose maps use plain keys, plus reference markers with siblings.
    fn schema_tree() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ./]{0,20}".prop_map(Value::String),
            "[a-zA-Z0-9_]{1,8}\\.yml".prop_map(|r| serde_json::json!({ "$ref": r })),
        ];
        leaf.prop_recursive(4, 64, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner.clone(), 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
                ("[a-zA-Z0-9_]{1,8}\\.yml", prop::collection::btree_map("[a-z]{1,8}", inner, 0..4))
                    .prop_map(|(r, m)| {
                        let mut map: Map<String, Value> = m.into_iter().collect();
                        map.insert(REF_KEY.to_string(), Value::String(r));
                        Value::Object(map)
                    }),
            ]
        })
    }

    /// Blank out every `$ref` value so two trees can be compared structurally.
    fn erase_refs(tree: &Value) -> Value {
        match NodeKind::classify(tree) {
            NodeKind::Reference { node, .. } => {
                let mut out: Map<String, Value> =
                    node.iter().map(|(k, v)| (k.clone(), erase_refs(v))).collect();
                out.insert(REF_KEY.to_string(), Value::Null);
                Value::Object(out)
            }
            NodeKind::Extends(map) | NodeKind::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), erase_refs(v))).collect(),
            ),
            NodeKind::Sequence(items) => Value::Array(items.iter().map(erase_refs).collect()),
            NodeKind::Scalar(v) => v.clone(),
        }
    }

    proptest! {
        /// Resolution changes `$ref` values and nothing else.
        #[test]
        fn resolution_only_touches_refs(tree in schema_tree()) {
            let resolved = resolve_reference_paths("/base/dir", &tree);
            prop_assert_eq!(erase_refs(&resolved), erase_refs(&tree));
        }

        /// The references of a resolved tree are exactly the joined originals.
        #[test]
        fn refs_after_resolution_are_joined_originals(tree in schema_tree()) {
            let expected: BTreeSet<String> = get_refs(&tree)
                .iter()
                .map(|r| join_reference("/base/dir", r))
                .collect();
            let resolved = resolve_reference_paths("/base/dir", &tree);
            prop_assert_eq!(get_refs(&resolved), expected);
        }
    }
}
