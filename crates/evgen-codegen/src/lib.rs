//! # evgen-codegen — TypeScript Generation and Compile Entry Point
//!
//! Consumes the [`EventCatalog`](evgen_schema::EventCatalog) produced by
//! `evgen-schema` and emits a single TypeScript module with, per event:
//!
//! - an interface for the event's properties, lowered from the JSON-Schema
//!   vocabulary (`type`, `enum`, `const`, `items`, `properties`, `required`,
//!   `additionalProperties`, `oneOf`/`anyOf`/`allOf`),
//! - an interface for the event envelope (`event`, `userId?`, `anonymousId?`,
//!   `properties`),
//! - a `make<Title>` factory that passes its arguments through.
//!
//! ## Modules
//!
//! - [`naming`] — title to identifier rules.
//! - [`lower`] — schema to TypeScript type lowering.
//! - [`emit`] — module text rendering.
//! - [`config`] — layered compile configuration (file, environment, flags).
//! - [`compile`] — glob → compose → emit → atomic write.
//!
//! ## Crate Policy
//!
//! - The output file is replaced atomically. A failed compile never leaves
//!   a partial module behind.
//! - Rendering is deterministic: events in title order, properties in key
//!   order.

pub mod compile;
pub mod config;
pub mod emit;
pub mod error;
pub mod lower;
pub mod naming;

pub use compile::{
    check, compile, compile_with, render, render_module, CheckOutcome, CompileReport, Rendered,
};
pub use config::{CompileConfig, ConfigError, ConfigLayer, ENV_OUTPUT, ENV_PATTERN};
pub use emit::{emit_module, EmitOptions, DEFAULT_BANNER};
pub use error::{CodegenError, CompileError};
pub use lower::{lower_schema, ObjectType, TsProperty, TsType};
pub use naming::{event_names, pascal_case, property_key, EventNames};
