//! # Extends Merging
//!
//! Folds inherited schema content into a derived document once its `extends`
//! marker has been substituted with the base document's resolved content.
//!
//! ## Merge Policy
//!
//! | Key | Result |
//! |-----|--------|
//! | `properties` | base entries first, derived entries override on key collision |
//! | `required` | union, base names first, first occurrence kept |
//! | `extends` | removed; it is a composition instruction, not an output field |
//! | `title`, `description`, `$id` | never inherited |
//! | any other key | derived wins; base-only keys are inherited |
//!
//! `extends` may also be a sequence of bases. They are layered left to right
//! (a later base overrides an earlier one) before the derived document is
//! applied on top. Key conflicts are never errors: the later layer wins.

use evgen_core::{
    DocumentPath, NodeKind, SchemaTree, EXTENDS_KEY, PROPERTIES_KEY, REQUIRED_KEY, TITLE_KEY,
};
use serde_json::{Map, Value};

use crate::error::ComposeError;

/// Keys that identify a document and are never copied from a base.
const IDENTITY_KEYS: &[&str] = &[TITLE_KEY, "description", "$id"];

/// Merge the substituted `extends` base(s) of `document` into it.
///
/// Documents without `extends` are returned unchanged. `path` is the derived
/// document, used for error reporting only.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidExtends`] if `extends` is not a map or a
/// sequence of maps, or still holds an unsubstituted reference marker.
pub fn merge_extends(document: SchemaTree, path: &DocumentPath) -> Result<SchemaTree, ComposeError> {
    let mut derived = match document {
        Value::Object(map) => map,
        other => return Ok(other),
    };
    let Some(extends) = derived.remove(EXTENDS_KEY) else {
        return Ok(Value::Object(derived));
    };

    let bases = match extends {
        Value::Array(items) => items,
        single => vec![single],
    };

    let mut merged = Map::new();
    for base in bases {
        let base = match NodeKind::classify(&base) {
            NodeKind::Reference { target, .. } => {
                return Err(ComposeError::InvalidExtends {
                    path: path.clone(),
                    reason: format!("base {target} was not substituted"),
                });
            }
            NodeKind::Map(_) | NodeKind::Extends(_) => merge_extends(base, path)?,
            NodeKind::Sequence(_) | NodeKind::Scalar(_) => {
                return Err(ComposeError::InvalidExtends {
                    path: path.clone(),
                    reason: format!("expected a schema map, found {}", kind_name(&base)),
                });
            }
        };
        if let Value::Object(mut base) = base {
            for key in IDENTITY_KEYS {
                base.remove(*key);
            }
            overlay(&mut merged, base);
        }
    }
    overlay(&mut merged, derived);

    tracing::trace!(path = %path, "merged extends");
    Ok(Value::Object(merged))
}

/// Apply `layer` on top of `acc`.
fn overlay(acc: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        let combined = match (key.as_str(), acc.remove(&key), value) {
            (PROPERTIES_KEY, Some(Value::Object(mut below)), Value::Object(above)) => {
                for (name, schema) in above {
                    below.insert(name, schema);
                }
                Value::Object(below)
            }
            (REQUIRED_KEY, Some(Value::Array(mut below)), Value::Array(above)) => {
                for name in above {
                    if !below.contains(&name) {
                        below.push(name);
                    }
                }
                Value::Array(below)
            }
            (_, _, value) => value,
        };
        acc.insert(key, combined);
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}
