//! # evgen-cli — Event Schema Compiler Command Line
//!
//! ## Subcommands
//!
//! - `compile` — compile schemas into a TypeScript module, or with
//!   `--check` verify that the committed module is current
//! - `refs` — list the documents each schema references directly
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; compilation lives in `evgen-codegen`.
//! - Handlers return an exit code. `0` success, `1` failed check or
//!   compile error.

pub mod compile;
pub mod refs;

use std::path::Path;

use anyhow::Result;
use evgen_codegen::ConfigLayer;

/// Assemble the configuration layers below the command-line flags:
/// defaults, then the `--config` file (if any), then the environment.
pub fn base_layer(config_file: Option<&Path>, env: ConfigLayer) -> Result<ConfigLayer> {
    let file = match config_file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config file");
            ConfigLayer::from_yaml_file(path)?
        }
        None => ConfigLayer::default(),
    };
    Ok(ConfigLayer::default().merge(file).merge(env))
}
