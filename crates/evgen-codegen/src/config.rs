//! Compile configuration.
//!
//! A [`CompileConfig`] is assembled from layers, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. an optional YAML file (`evgen.yml` style),
//! 3. environment variables,
//! 4. explicit values (CLI flags).
//!
//! Each layer is a [`ConfigLayer`] of optional fields; later layers
//! override earlier ones field by field. `pattern` and `output` have no
//! default and must be supplied by some layer.
//!
//! ```yaml
//! pattern: schemas/**/*.yml
//! output: src/generated/analytics.ts
//! banner: Generated analytics helpers.
//! include_event_name: true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::emit::EmitOptions;

/// Environment variable holding the input glob.
pub const ENV_PATTERN: &str = "EVGEN_PATTERN";
/// Environment variable holding the output path.
pub const ENV_OUTPUT: &str = "EVGEN_OUTPUT";

/// Resolved configuration for one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileConfig {
    /// Glob selecting schema documents.
    pub pattern: String,
    /// Destination TypeScript file.
    pub output: PathBuf,
    /// Rendering knobs.
    pub emit: EmitOptions,
}

impl CompileConfig {
    /// Config with default rendering options.
    pub fn new(pattern: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            output: output.into(),
            emit: EmitOptions::default(),
        }
    }
}

/// One configuration source. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Glob selecting schema documents.
    pub pattern: Option<String>,
    /// Destination TypeScript file.
    pub output: Option<PathBuf>,
    /// Module banner comment.
    pub banner: Option<String>,
    /// Stamp the event title into each event.
    pub include_event_name: Option<bool>,
}

impl ConfigLayer {
    /// Parse a YAML configuration document.
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        // An empty file deserializes as unit, not as an empty map.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a YAML configuration file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&text, path)
    }

    /// Layer from the process environment.
    ///
    /// Variables:
    /// - `EVGEN_PATTERN` — input glob
    /// - `EVGEN_OUTPUT` — output path
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Layer from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());
        Self {
            pattern: get(ENV_PATTERN),
            output: get(ENV_OUTPUT).map(PathBuf::from),
            ..Self::default()
        }
    }

    /// Overlay `higher` onto `self`; fields set in `higher` win.
    #[must_use]
    pub fn merge(self, higher: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            pattern: higher.pattern.or(self.pattern),
            output: higher.output.or(self.output),
            banner: higher.banner.or(self.banner),
            include_event_name: higher.include_event_name.or(self.include_event_name),
        }
    }

    /// Fill defaults and check required fields.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] if no layer supplied `pattern` or `output`.
    pub fn resolve(self) -> Result<CompileConfig, ConfigError> {
        let defaults = EmitOptions::default();
        let pattern = self.pattern.ok_or(ConfigError::Missing {
            field: "pattern",
            env: ENV_PATTERN,
        })?;
        let output = self.output.ok_or(ConfigError::Missing {
            field: "output",
            env: ENV_OUTPUT,
        })?;
        Ok(CompileConfig {
            pattern,
            output,
            emit: EmitOptions {
                banner: self.banner.unwrap_or(defaults.banner),
                include_event_name: self
                    .include_event_name
                    .unwrap_or(defaults.include_event_name),
            },
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },
    /// The config file is not valid YAML or has unknown keys.
    #[error("invalid config file {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
    /// No layer supplied a required field.
    #[error("no {field} configured (set it in the config file, via {env}, or on the command line)")]
    Missing {
        field: &'static str,
        env: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn origin() -> &'static Path {
        Path::new("evgen.yml")
    }

    #[test]
    fn yaml_layer_parses_all_fields() {
        let layer = ConfigLayer::from_yaml_str(
            "pattern: schemas/*.yml\noutput: out/events.ts\nbanner: hi\ninclude_event_name: false\n",
            origin(),
        )
        .unwrap();
        assert_eq!(layer.pattern.as_deref(), Some("schemas/*.yml"));
        assert_eq!(layer.output, Some(PathBuf::from("out/events.ts")));
        assert_eq!(layer.banner.as_deref(), Some("hi"));
        assert_eq!(layer.include_event_name, Some(false));
    }

    #[test]
    fn yaml_layer_rejects_unknown_keys() {
        let err = ConfigLayer::from_yaml_str("patern: x\n", origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("evgen.yml"));
    }

    #[test]
    fn empty_yaml_is_an_empty_layer() {
        assert_eq!(
            ConfigLayer::from_yaml_str("\n", origin()).unwrap(),
            ConfigLayer::default()
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ConfigLayer::from_yaml_file(Path::new("/nonexistent/evgen.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn lookup_layer_reads_known_variables() {
        let vars = HashMap::from([
            (ENV_PATTERN, "a/**/*.yml".to_string()),
            (ENV_OUTPUT, String::new()),
        ]);
        let layer = ConfigLayer::from_lookup(|v| vars.get(v).cloned());
        assert_eq!(layer.pattern.as_deref(), Some("a/**/*.yml"));
        assert_eq!(layer.output, None);
    }

    #[test]
    fn higher_layer_wins_field_by_field() {
        let file = ConfigLayer {
            pattern: Some("file/*.yml".into()),
            output: Some("file.ts".into()),
            banner: Some("file banner".into()),
            include_event_name: None,
        };
        let env = ConfigLayer {
            output: Some("env.ts".into()),
            ..ConfigLayer::default()
        };
        let flags = ConfigLayer {
            include_event_name: Some(false),
            ..ConfigLayer::default()
        };
        let config = file.merge(env).merge(flags).resolve().unwrap();
        assert_eq!(config.pattern, "file/*.yml");
        assert_eq!(config.output, PathBuf::from("env.ts"));
        assert_eq!(config.emit.banner, "file banner");
        assert!(!config.emit.include_event_name);
    }

    #[test]
    fn defaults_fill_rendering_options() {
        let config = ConfigLayer {
            pattern: Some("*.yml".into()),
            output: Some("out.ts".into()),
            ..ConfigLayer::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(config, CompileConfig::new("*.yml", "out.ts"));
    }

    #[test]
    fn missing_pattern_is_reported() {
        let err = ConfigLayer {
            output: Some("out.ts".into()),
            ..ConfigLayer::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "pattern", .. }));
        assert!(err.to_string().contains(ENV_PATTERN));
    }
}
