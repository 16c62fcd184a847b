//! # Schema Markup Parsing
//!
//! Parses document text into a [`SchemaTree`]. YAML is the primary markup;
//! JSON documents are accepted by extension. YAML is converted into the
//! equivalent JSON value tree so the rest of the pipeline sees one model.

use serde_json::Value;

use crate::error::CoreError;
use crate::tree::SchemaTree;

/// Markup a document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.yml` / `.yaml`, and anything with an unknown extension.
    Yaml,
    /// `.json`.
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_extension(ext: Option<&str>) -> Self {
        match ext {
            Some(e) if e.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DocumentFormat::Yaml => "YAML",
            DocumentFormat::Json => "JSON",
        }
    }
}

/// Parse `text` as `format` into a schema tree.
///
/// # Errors
///
/// Returns [`CoreError::Parse`] if the text is malformed or uses YAML
/// features with no JSON equivalent (non-scalar map keys, non-finite floats).
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<SchemaTree, CoreError> {
    let parse_err = |reason: String| CoreError::Parse {
        format: format.label(),
        reason,
    };
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| parse_err(e.to_string())),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
            yaml_to_json_value(&yaml).map_err(parse_err)
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Schema documents use only the JSON-compatible subset of YAML. Tags are
/// ignored and their inner value converted.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER_YAML: &str = r#"title: registers a user
type: object
properties:
  firstName:
    type: string
  age:
    description: Age in years
    type: integer
    minimum: 0
  hairColor:
    enum:
    - black
    - brown
    type: string
extends:
  $ref: './BaseType.yml'
additionalProperties: false
required:
- firstName
"#;

    #[test]
    fn test_parse_yaml_event_document() {
        let tree = parse_document(USER_YAML, DocumentFormat::Yaml).unwrap();
        assert_eq!(tree["title"], "registers a user");
        assert_eq!(tree["properties"]["age"]["minimum"], 0);
        assert_eq!(tree["properties"]["hairColor"]["enum"], json!(["black", "brown"]));
        assert_eq!(tree["extends"]["$ref"], "./BaseType.yml");
        assert_eq!(tree["additionalProperties"], false);
        assert_eq!(tree["required"], json!(["firstName"]));
    }

    #[test]
    fn test_parse_json_document() {
        let tree = parse_document(r#"{"title": "x", "type": "object"}"#, DocumentFormat::Json)
            .unwrap();
        assert_eq!(tree, json!({"title": "x", "type": "object"}));
    }

    #[test]
    fn test_parse_error_names_format() {
        let err = parse_document("title: [unclosed", DocumentFormat::Yaml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("invalid YAML"), "got: {msg}");

        let err = parse_document("{not json", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().starts_with("invalid JSON"));
    }

    #[test]
    fn test_non_scalar_yaml_key_rejected() {
        let err = parse_document("? [a, b]\n: value\n", DocumentFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("unsupported YAML map key"));
    }

    #[test]
    fn test_numeric_and_bool_keys_stringified() {
        let tree = parse_document("1: one\ntrue: yes\n", DocumentFormat::Yaml).unwrap();
        assert_eq!(tree["1"], "one");
        assert_eq!(tree["true"], "yes");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension(Some("json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_extension(Some("JSON")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_extension(Some("yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_extension(None), DocumentFormat::Yaml);
    }
}
