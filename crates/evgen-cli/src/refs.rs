//! # Refs Subcommand
//!
//! Prints, for every enumerated document, the absolute paths it references
//! directly. Targets that are not among the enumerated documents are
//! flagged; those are the references a compile would reject.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use clap::Args;

use evgen_codegen::ConfigLayer;
use evgen_core::DocumentPath;
use evgen_schema::{Composer, DocumentStore};

/// Arguments for the `evgen refs` subcommand.
#[derive(Args, Debug, Default)]
pub struct RefsArgs {
    /// Glob selecting schema documents. Falls back to the configured pattern.
    #[arg(value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Print a JSON object instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Direct references per document, in path order.
pub type ReferenceTable = BTreeMap<DocumentPath, BTreeSet<DocumentPath>>;

/// Collect the direct references of every document matched by `pattern`,
/// together with the set of enumerated documents.
pub fn collect_references(pattern: &str) -> Result<(ReferenceTable, BTreeSet<DocumentPath>)> {
    let store = DocumentStore::from_glob(pattern)?;
    let composer = Composer::new(&store);
    let mut table = ReferenceTable::new();
    for path in store.paths() {
        let refs = composer
            .direct_references(path)
            .with_context(|| format!("failed to read references of {path}"))?;
        table.insert(path.clone(), refs);
    }
    Ok((table, store.paths().cloned().collect()))
}

/// Text rendering: one block per document, unresolved targets flagged.
pub fn format_text(table: &ReferenceTable, known: &BTreeSet<DocumentPath>) -> String {
    let mut out = String::new();
    for (path, refs) in table {
        out.push_str(path.as_str());
        out.push('\n');
        for target in refs {
            if known.contains(target) {
                out.push_str(&format!("  -> {target}\n"));
            } else {
                out.push_str(&format!("  -> {target} (not enumerated)\n"));
            }
        }
    }
    out
}

/// Execute the refs subcommand.
///
/// Returns exit code: 0 when every reference targets an enumerated
/// document, 1 otherwise.
pub fn run_refs(args: &RefsArgs, base: ConfigLayer) -> Result<u8> {
    let pattern = args
        .pattern
        .clone()
        .or(base.pattern)
        .context("no pattern given (pass one or configure it)")?;

    let (table, known) = collect_references(&pattern)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        print!("{}", format_text(&table, &known));
    }

    let dangling = table
        .values()
        .flatten()
        .filter(|target| !known.contains(*target))
        .count();
    if dangling > 0 {
        tracing::warn!(dangling, "references point outside the enumerated documents");
        return Ok(1);
    }
    Ok(0)
}
