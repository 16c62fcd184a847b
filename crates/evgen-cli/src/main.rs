//! # evgen CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evgen_cli::compile::{run_compile, CompileArgs};
use evgen_cli::refs::{run_refs, RefsArgs};
use evgen_codegen::ConfigLayer;

/// evgen — analytics event schema compiler
///
/// Reads YAML/JSON event schemas that reference and extend each other,
/// resolves them into self-contained definitions, and generates a
/// TypeScript module with one typed `make<Event>` factory per event.
#[derive(Parser, Debug)]
#[command(name = "evgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile schemas into a TypeScript module.
    Compile(CompileArgs),

    /// List the documents each schema references.
    Refs(RefsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr; stdout carries command output.
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "evgen starting");

    let result = evgen_cli::base_layer(cli.config.as_deref(), ConfigLayer::from_env())
        .and_then(|base| match &cli.command {
            Commands::Compile(args) => run_compile(args, base),
            Commands::Refs(args) => run_refs(args, base),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
