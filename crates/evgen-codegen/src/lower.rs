//! # Schema Lowering
//!
//! Maps a composed JSON-Schema tree onto a small TypeScript type AST and
//! renders it. Only the structural vocabulary is lowered; validation
//! keywords (`minimum`, `pattern`, `format`, ...) have no TypeScript
//! counterpart and are ignored.
//!
//! | Schema | TypeScript |
//! |--------|------------|
//! | `type: string` | `string` |
//! | `type: integer` / `number` | `number` |
//! | `type: [string, "null"]` | `string \| null` |
//! | `enum: [a, b]` | `"a" \| "b"` |
//! | `const: 3` | `3` |
//! | `type: array`, `items: S` | `Array<S>` |
//! | `type: object`, `properties` | inline object, `?` on non-required keys |
//! | `additionalProperties` absent or `true` | `[key: string]: unknown` |
//! | `additionalProperties: S` | `[key: string]: S \| <declared property types>` |
//! | `oneOf` / `anyOf` | union |
//! | `allOf` | intersection |
//! | anything else | `unknown` |

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use evgen_core::{ADDITIONAL_PROPERTIES_KEY, PROPERTIES_KEY, REQUIRED_KEY};

use crate::naming::property_key;

/// A TypeScript type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    /// `string`, `number`, `boolean`, `null`, `undefined`, `unknown`, `never`.
    Keyword(&'static str),
    /// A literal type, already rendered (`"blue"`, `3`, `true`).
    Literal(String),
    /// `Array<T>`.
    Array(Box<TsType>),
    /// An inline object type.
    Object(ObjectType),
    /// `A | B`.
    Union(Vec<TsType>),
    /// `A & B`.
    Intersection(Vec<TsType>),
}

/// An inline object type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectType {
    /// Declared properties, in key order.
    pub properties: Vec<TsProperty>,
    /// Index signature value type, when extra keys are allowed.
    pub index: Option<Box<TsType>>,
}

/// One property of an [`ObjectType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsProperty {
    /// Property name as declared in the schema.
    pub name: String,
    /// True when the name is not listed in `required`.
    pub optional: bool,
    /// Schema `description`, rendered as a doc comment.
    pub doc: Option<String>,
    /// Property type.
    pub ty: TsType,
}

const UNKNOWN: TsType = TsType::Keyword("unknown");
const NEVER: TsType = TsType::Keyword("never");
const UNDEFINED: TsType = TsType::Keyword("undefined");

/// Lower a schema node.
pub fn lower_schema(schema: &Value) -> TsType {
    match schema {
        Value::Object(map) => lower_map(map),
        Value::Bool(false) => NEVER,
        _ => UNKNOWN,
    }
}

fn lower_map(map: &Map<String, Value>) -> TsType {
    if let Some(value) = map.get("const") {
        return literal(value).unwrap_or(UNKNOWN);
    }
    if let Some(Value::Array(values)) = map.get("enum") {
        return union(values.iter().map(|v| literal(v).unwrap_or(UNKNOWN)).collect());
    }
    for key in ["oneOf", "anyOf"] {
        if let Some(Value::Array(branches)) = map.get(key) {
            return union(branches.iter().map(lower_schema).collect());
        }
    }
    if let Some(Value::Array(parts)) = map.get("allOf") {
        return intersection(parts.iter().map(lower_schema).collect());
    }

    match map.get("type") {
        Some(Value::String(name)) => lower_typed(name, map),
        Some(Value::Array(names)) => union(
            names
                .iter()
                .map(|n| n.as_str().map_or(UNKNOWN, |n| lower_typed(n, map)))
                .collect(),
        ),
        _ if map.contains_key(PROPERTIES_KEY) => TsType::Object(lower_object(map)),
        _ if map.contains_key("items") => lower_typed("array", map),
        _ => UNKNOWN,
    }
}

fn lower_typed(name: &str, map: &Map<String, Value>) -> TsType {
    match name {
        "string" => TsType::Keyword("string"),
        "integer" | "number" => TsType::Keyword("number"),
        "boolean" => TsType::Keyword("boolean"),
        "null" => TsType::Keyword("null"),
        "array" => {
            let item = match map.get("items") {
                Some(Value::Array(tuple)) => union(tuple.iter().map(lower_schema).collect()),
                Some(items) => lower_schema(items),
                None => UNKNOWN,
            };
            TsType::Array(Box::new(item))
        }
        "object" => TsType::Object(lower_object(map)),
        _ => UNKNOWN,
    }
}

fn lower_object(map: &Map<String, Value>) -> ObjectType {
    let required: BTreeSet<&str> = map
        .get(REQUIRED_KEY)
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let properties: Vec<TsProperty> = map
        .get(PROPERTIES_KEY)
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| TsProperty {
                    name: name.clone(),
                    optional: !required.contains(name.as_str()),
                    doc: schema
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    ty: lower_schema(schema),
                })
                .collect()
        })
        .unwrap_or_default();

    let index = match map.get(ADDITIONAL_PROPERTIES_KEY) {
        Some(Value::Bool(false)) => None,
        None | Some(Value::Bool(true)) => Some(Box::new(UNKNOWN)),
        Some(schema) => Some(Box::new(index_type(lower_schema(schema), &properties))),
    };

    ObjectType { properties, index }
}

/// Declared properties must be assignable to the index signature, so the
/// index type widens to cover them.
fn index_type(extra: TsType, properties: &[TsProperty]) -> TsType {
    let mut members = vec![extra];
    members.extend(properties.iter().map(|p| p.ty.clone()));
    if properties.iter().any(|p| p.optional) {
        members.push(UNDEFINED);
    }
    union(members)
}

/// Literal types exist for strings, numbers, booleans, and null.
fn literal(value: &Value) -> Option<TsType> {
    match value {
        Value::Null => Some(TsType::Keyword("null")),
        Value::Array(_) | Value::Object(_) => None,
        scalar => Some(TsType::Literal(scalar.to_string())),
    }
}

/// Flatten nested unions, drop duplicates, and collapse singletons.
fn union(members: Vec<TsType>) -> TsType {
    let mut flat: Vec<TsType> = Vec::with_capacity(members.len());
    for member in members {
        let parts = match member {
            TsType::Union(inner) => inner,
            other => vec![other],
        };
        for part in parts {
            if !flat.contains(&part) {
                flat.push(part);
            }
        }
    }
    if flat.contains(&UNKNOWN) {
        return UNKNOWN;
    }
    flat.retain(|t| *t != NEVER);
    match flat.len() {
        0 => NEVER,
        1 => flat.remove(0),
        _ => TsType::Union(flat),
    }
}

fn intersection(members: Vec<TsType>) -> TsType {
    let mut flat: Vec<TsType> = Vec::with_capacity(members.len());
    for member in members {
        match member {
            TsType::Intersection(inner) => flat.extend(inner),
            other if other == UNKNOWN => {}
            other => flat.push(other),
        }
    }
    match flat.len() {
        0 => UNKNOWN,
        1 => flat.remove(0),
        _ => TsType::Intersection(flat),
    }
}

impl TsType {
    /// Render as TypeScript. `indent` is the nesting depth of the line the
    /// type starts on; multi-line object bodies are indented one level
    /// deeper and close at `indent`.
    pub fn render(&self, indent: usize) -> String {
        match self {
            TsType::Keyword(k) => (*k).to_string(),
            TsType::Literal(text) => text.clone(),
            TsType::Array(item) => format!("Array<{}>", item.render(indent)),
            TsType::Object(object) => object.render(indent),
            TsType::Union(members) => members
                .iter()
                .map(|m| m.render(indent))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(members) => members
                .iter()
                .map(|m| match m {
                    TsType::Union(_) => format!("({})", m.render(indent)),
                    _ => m.render(indent),
                })
                .collect::<Vec<_>>()
                .join(" & "),
        }
    }
}

impl ObjectType {
    /// Render as an object type literal.
    pub fn render(&self, indent: usize) -> String {
        if self.properties.is_empty() && self.index.is_none() {
            return "{}".to_string();
        }
        let mut out = String::from("{\n");
        out.push_str(&self.render_members(indent + 1));
        out.push_str(&pad(indent));
        out.push('}');
        out
    }

    /// Render the member lines only, each ending in `;\n`.
    pub fn render_members(&self, indent: usize) -> String {
        let mut out = String::new();
        for property in &self.properties {
            if let Some(doc) = &property.doc {
                out.push_str(&doc_comment(doc, indent));
            }
            out.push_str(&format!(
                "{}{}{}: {};\n",
                pad(indent),
                property_key(&property.name),
                if property.optional { "?" } else { "" },
                property.ty.render(indent),
            ));
        }
        if let Some(index) = &self.index {
            out.push_str(&format!(
                "{}[key: string]: {};\n",
                pad(indent),
                index.render(indent)
            ));
        }
        out
    }
}

/// A `/** ... */` block at the given depth.
pub(crate) fn doc_comment(text: &str, indent: usize) -> String {
    let text = text.trim().replace("*/", "*\\/");
    let prefix = pad(indent);
    let lines: Vec<&str> = text.lines().collect();
    match lines.as_slice() {
        [] => String::new(),
        [single] => format!("{prefix}/** {single} */\n"),
        many => {
            let mut out = format!("{prefix}/**\n");
            for line in many {
                let line = line.trim_end();
                if line.is_empty() {
                    out.push_str(&format!("{prefix} *\n"));
                } else {
                    out.push_str(&format!("{prefix} * {line}\n"));
                }
            }
            out.push_str(&format!("{prefix} */\n"));
            out
        }
    }
}

pub(crate) fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}
