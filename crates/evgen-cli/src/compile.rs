//! # Compile Subcommand
//!
//! `evgen compile 'schemas/**/*.yml' -o src/analytics.ts`
//!
//! With `--check`, renders the module in memory and compares it with the
//! existing output instead of writing. Intended for CI: exit code 1 means
//! the generated file needs regenerating.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use evgen_codegen::{check, compile_with, CheckOutcome, ConfigLayer};

/// Arguments for the `evgen compile` subcommand.
#[derive(Args, Debug, Default)]
pub struct CompileArgs {
    /// Glob selecting schema documents (quote it to stop shell expansion).
    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// TypeScript file to write.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Comment placed at the top of the generated module.
    #[arg(long)]
    pub banner: Option<String>,

    /// Omit the `event` name field from generated events.
    #[arg(long)]
    pub no_event_name: bool,

    /// Verify the output is up to date instead of writing it.
    #[arg(long)]
    pub check: bool,
}

impl CompileArgs {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            pattern: self.pattern.clone(),
            output: self.output.clone(),
            banner: self.banner.clone(),
            include_event_name: self.no_event_name.then_some(false),
        }
    }
}

/// Execute the compile subcommand on top of the lower configuration layers.
///
/// Returns exit code: 0 on success, 1 if `--check` finds the output stale
/// or missing.
pub fn run_compile(args: &CompileArgs, base: ConfigLayer) -> Result<u8> {
    let config = base
        .merge(args.layer())
        .resolve()
        .context("incomplete configuration")?;
    tracing::debug!(pattern = %config.pattern, output = %config.output.display(), "compiling");

    if args.check {
        let outcome = check(&config)
            .with_context(|| format!("failed to check {}", config.output.display()))?;
        return Ok(match outcome {
            CheckOutcome::UpToDate => {
                println!("OK: {} is up to date", config.output.display());
                0
            }
            CheckOutcome::Stale => {
                println!(
                    "FAIL: {} is out of date; run `evgen compile` to regenerate it",
                    config.output.display()
                );
                1
            }
            CheckOutcome::Missing => {
                println!("FAIL: {} does not exist", config.output.display());
                1
            }
        });
    }

    let report = compile_with(&config)
        .with_context(|| format!("failed to compile '{}'", config.pattern))?;
    println!(
        "OK: wrote {} event(s) from {} document(s) to {} ({} bytes)",
        report.events,
        report.documents,
        report.output.display(),
        report.bytes
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evgen_codegen::CompileError;
    use evgen_schema::ComposeError;

    fn schemas(files: &[(&str, &str)]) -> (tempfile::TempDir, String, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            std::fs::write(dir.path().join(name), text).unwrap();
        }
        let pattern = format!("{}/*.yml", dir.path().display());
        let output = dir.path().join("events.ts");
        (dir, pattern, output)
    }

    #[test]
    fn compile_then_check() {
        let (_dir, pattern, output) = schemas(&[("Login.yml", "title: logs in\n")]);
        let args = CompileArgs {
            pattern: Some(pattern),
            output: Some(output.clone()),
            ..CompileArgs::default()
        };
        assert_eq!(run_compile(&args, ConfigLayer::default()).unwrap(), 0);
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .contains("export const makeLogsIn"));

        let check_args = CompileArgs { check: true, ..args };
        assert_eq!(run_compile(&check_args, ConfigLayer::default()).unwrap(), 0);

        std::fs::write(&output, "edited by hand").unwrap();
        assert_eq!(run_compile(&check_args, ConfigLayer::default()).unwrap(), 1);
    }

    #[test]
    fn check_without_output_file_fails() {
        let (_dir, pattern, output) = schemas(&[("Login.yml", "title: logs in\n")]);
        let args = CompileArgs {
            pattern: Some(pattern),
            output: Some(output.clone()),
            check: true,
            ..CompileArgs::default()
        };
        assert_eq!(run_compile(&args, ConfigLayer::default()).unwrap(), 1);
        assert!(!output.exists());
    }

    #[test]
    fn flags_fill_in_base_layer() {
        let (_dir, pattern, output) = schemas(&[("Login.yml", "title: logs in\n")]);
        let base = ConfigLayer {
            pattern: Some(pattern),
            banner: Some("custom banner".into()),
            ..ConfigLayer::default()
        };
        let args = CompileArgs {
            output: Some(output.clone()),
            no_event_name: true,
            ..CompileArgs::default()
        };
        assert_eq!(run_compile(&args, base).unwrap(), 0);
        let module = std::fs::read_to_string(&output).unwrap();
        assert!(module.starts_with("// custom banner\n"));
        assert!(!module.contains("event: \"logs in\""));
    }

    #[test]
    fn missing_output_is_a_configuration_error() {
        let args = CompileArgs {
            pattern: Some("*.yml".into()),
            ..CompileArgs::default()
        };
        let err = run_compile(&args, ConfigLayer::default()).unwrap_err();
        assert!(format!("{err:#}").contains("no output configured"));
    }

    #[test]
    fn compile_errors_keep_their_cause() {
        let (_dir, pattern, output) = schemas(&[(
            "Post.yml",
            "title: sends a post\nextends:\n  $ref: './Missing.yml'\n",
        )]);
        let args = CompileArgs {
            pattern: Some(pattern),
            output: Some(output.clone()),
            ..CompileArgs::default()
        };
        let err = run_compile(&args, ConfigLayer::default()).unwrap_err();
        let cause = err.downcast_ref::<CompileError>().unwrap();
        assert!(matches!(
            cause,
            CompileError::Compose(ComposeError::UnresolvedReference { .. })
        ));
        assert!(!output.exists());
    }
}
