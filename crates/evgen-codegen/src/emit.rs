//! # Module Emission
//!
//! Renders an [`EventCatalog`] as one TypeScript module. Every event becomes
//! three declarations:
//!
//! ```text
//! export interface RegistersAUserProperties { ... }
//!
//! export interface RegistersAUserEvent {
//!   event: "registers a user";
//!   userId?: string;
//!   anonymousId?: string;
//!   properties: RegistersAUserProperties;
//! }
//!
//! export const makeRegistersAUser = ({ userId, anonymousId, properties }: ...) => ({ ... });
//! ```
//!
//! The factory does no validation; it passes `userId`, `anonymousId`, and
//! `properties` through unchanged and stamps the event name.

use std::collections::HashMap;

use evgen_schema::{ComposedEvent, EventCatalog};

use crate::error::CodegenError;
use crate::lower::{doc_comment, lower_schema, TsType};
use crate::naming::{event_names, EventNames};

/// Banner written when none is configured.
pub const DEFAULT_BANNER: &str =
    "This file is generated by evgen from event schemas. Do not edit it by hand.";

/// Knobs for [`emit_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Comment placed at the top of the module. Empty disables it.
    pub banner: String,
    /// Stamp the event title into each event as an `event` field.
    pub include_event_name: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            banner: DEFAULT_BANNER.to_string(),
            include_event_name: true,
        }
    }
}

/// Render the whole catalog.
///
/// # Errors
///
/// [`CodegenError::InvalidIdentifier`] for a title with no identifier
/// characters, [`CodegenError::DuplicateIdentifier`] when two titles
/// collide after slugging.
pub fn emit_module(
    catalog: &EventCatalog,
    options: &EmitOptions,
) -> Result<String, CodegenError> {
    let named = assign_names(catalog)?;

    let mut out = String::new();
    for line in options.banner.lines().map(str::trim_end) {
        if line.is_empty() {
            out.push_str("//\n");
        } else {
            out.push_str(&format!("// {line}\n"));
        }
    }
    if !options.banner.trim().is_empty() {
        out.push('\n');
    }
    out.push_str("/* eslint-disable */\n");

    for (event, names) in named {
        out.push('\n');
        out.push_str(&render_event(event, &names, options));
    }
    Ok(out)
}

fn assign_names(catalog: &EventCatalog) -> Result<Vec<(&ComposedEvent, EventNames)>, CodegenError> {
    // Factory and type names are derived differently, so each needs its own check.
    let mut factories: HashMap<String, &str> = HashMap::with_capacity(catalog.len());
    let mut types: HashMap<String, &str> = HashMap::with_capacity(catalog.len());
    let mut named = Vec::with_capacity(catalog.len());
    for event in catalog.iter() {
        let names = event_names(&event.title)?;
        for (seen, identifier) in [
            (&mut factories, &names.factory),
            (&mut types, &names.properties_type),
        ] {
            if let Some(first) = seen.insert(identifier.clone(), &event.title) {
                return Err(CodegenError::DuplicateIdentifier {
                    identifier: identifier.clone(),
                    first: first.to_string(),
                    second: event.title.clone(),
                });
            }
        }
        named.push((event, names));
    }
    Ok(named)
}

fn render_event(event: &ComposedEvent, names: &EventNames, options: &EmitOptions) -> String {
    let title = serde_json::Value::String(event.title.clone()).to_string();
    let description = event.schema.get("description").and_then(|d| d.as_str());
    let mut out = String::new();

    // Properties type.
    let doc = match description {
        Some(text) => format!("{}\n\n{}", event.title, text),
        None => event.title.clone(),
    };
    out.push_str(&doc_comment(&doc, 0));
    match lower_schema(&event.schema) {
        TsType::Object(object) => {
            out.push_str(&format!("export interface {} {{\n", names.properties_type));
            out.push_str(&object.render_members(1));
            out.push_str("}\n");
        }
        other => out.push_str(&format!(
            "export type {} = {};\n",
            names.properties_type,
            other.render(0)
        )),
    }

    // Envelope.
    out.push('\n');
    out.push_str(&format!("export interface {} {{\n", names.event_type));
    if options.include_event_name {
        out.push_str(&format!("  event: {title};\n"));
    }
    out.push_str("  userId?: string;\n");
    out.push_str("  anonymousId?: string;\n");
    out.push_str(&format!("  properties: {};\n", names.properties_type));
    out.push_str("}\n");

    // Factory.
    out.push('\n');
    out.push_str(&doc_comment(&format!("Build a {title} event."), 0));
    out.push_str(&format!("export const {} = ({{\n", names.factory));
    out.push_str("  userId,\n  anonymousId,\n  properties,\n}: {\n");
    out.push_str("  userId?: string;\n  anonymousId?: string;\n");
    out.push_str(&format!("  properties: {};\n", names.properties_type));
    out.push_str(&format!("}}): {} => ({{\n", names.event_type));
    if options.include_event_name {
        out.push_str(&format!("  event: {title},\n"));
    }
    out.push_str("  userId,\n  anonymousId,\n  properties,\n});\n");
    out
}
