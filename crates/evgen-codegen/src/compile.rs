//! # Compile Entry Point
//!
//! `pattern → store → composer → emitter → output file`.
//!
//! ## Invariant
//!
//! The output file is either left untouched or replaced in full. The module
//! is rendered completely in memory, written to a temporary file in the
//! output's directory, and renamed over the destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use evgen_schema::{Composer, DocumentStore};

use crate::config::CompileConfig;
use crate::emit::{emit_module, EmitOptions};
use crate::error::CompileError;

/// Summary of a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    /// Documents matched by the pattern.
    pub documents: usize,
    /// Events emitted.
    pub events: usize,
    /// Size of the module in bytes.
    pub bytes: usize,
    /// Where the module was written.
    pub output: PathBuf,
}

/// A module rendered in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Module text.
    pub module: String,
    /// Documents matched by the pattern.
    pub documents: usize,
    /// Events rendered.
    pub events: usize,
}

/// Result of comparing a fresh render with the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The output file matches the rendered module byte for byte.
    UpToDate,
    /// The output file differs from the rendered module.
    Stale,
    /// The output file does not exist.
    Missing,
}

/// Compile every schema matched by `pattern` into one TypeScript module at
/// `output`, with default rendering options.
///
/// # Errors
///
/// The first failure encountered: glob or enumeration problems, unreadable
/// or unparsable documents, missing references, reference cycles, malformed
/// `extends`, identifier collisions, or an unwritable output. On error the
/// output file is not created or modified.
pub fn compile(pattern: &str, output: impl AsRef<Path>) -> Result<CompileReport, CompileError> {
    compile_with(&CompileConfig::new(pattern, output.as_ref()))
}

/// [`compile`] with explicit configuration.
pub fn compile_with(config: &CompileConfig) -> Result<CompileReport, CompileError> {
    let rendered = render(config)?;
    write_atomically(&config.output, &rendered.module)?;

    let report = CompileReport {
        documents: rendered.documents,
        events: rendered.events,
        bytes: rendered.module.len(),
        output: config.output.clone(),
    };
    tracing::info!(
        output = %report.output.display(),
        documents = report.documents,
        events = report.events,
        bytes = report.bytes,
        "wrote TypeScript module"
    );
    Ok(report)
}

/// Compose and render without touching the filesystem beyond reading
/// schemas.
pub fn render(config: &CompileConfig) -> Result<Rendered, CompileError> {
    render_pattern(&config.pattern, &config.emit)
}

/// Render the module for `pattern` with default options and return it as a
/// string.
pub fn render_module(pattern: &str) -> Result<String, CompileError> {
    Ok(render_pattern(pattern, &EmitOptions::default())?.module)
}

/// Render and compare with the current output file.
pub fn check(config: &CompileConfig) -> Result<CheckOutcome, CompileError> {
    let rendered = render(config)?;
    let outcome = match std::fs::read(&config.output) {
        Ok(existing) if existing == rendered.module.as_bytes() => CheckOutcome::UpToDate,
        Ok(_) => CheckOutcome::Stale,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckOutcome::Missing,
        Err(e) => {
            return Err(CompileError::OutputRead {
                path: config.output.clone(),
                reason: e.to_string(),
            })
        }
    };
    tracing::debug!(output = %config.output.display(), ?outcome, "checked output");
    Ok(outcome)
}

fn render_pattern(pattern: &str, options: &EmitOptions) -> Result<Rendered, CompileError> {
    let store = DocumentStore::from_glob(pattern)?;
    store.preload()?;
    let catalog = Composer::new(&store).compose_all()?;
    let module = emit_module(&catalog, options)?;
    Ok(Rendered {
        module,
        documents: store.len(),
        events: catalog.len(),
    })
}

fn write_atomically(path: &Path, contents: &str) -> Result<(), CompileError> {
    let write_error = |reason: String| CompileError::OutputWrite {
        path: path.to_path_buf(),
        reason,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".evgen-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| write_error(e.to_string()))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| write_error(e.to_string()))?;
    let file = tmp.persist(path).map_err(|e| write_error(e.error.to_string()))?;

    // Temporary files are created owner-only; generated sources are not.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| write_error(e.to_string()))?;
    }
    #[cfg(not(unix))]
    drop(file);
    Ok(())
}
