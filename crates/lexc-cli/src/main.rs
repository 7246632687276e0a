//! # lexc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lexc_cli::compile::{run_compile, CompileArgs};
use lexc_cli::paths::{run_paths, PathsArgs};
use lexc_cli::validate::{run_validate, ValidateArgs};
use lexc_cli::GlobalOptions;

/// Lexicon compiler.
///
/// Compiles Lexicon schema documents into validators, exports them as JSON
/// Schema, validates instances and lists override paths.
#[derive(Parser, Debug)]
#[command(name = "lexc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file (YAML or JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of lexicons available to references. Repeatable.
    #[arg(long = "lexicons", value_name = "DIR", global = true)]
    lexicon_dirs: Vec<PathBuf>,

    /// Compile references to accept-anything instead of resolving them.
    #[arg(long, global = true)]
    no_follow_refs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a lexicon and summarize or export it.
    Compile(CompileArgs),

    /// Validate an instance document against a compiled definition.
    Validate(ValidateArgs),

    /// List the override paths of a lexicon.
    Paths(PathsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("lexc v{} starting", env!("CARGO_PKG_VERSION"));

    let global = GlobalOptions {
        config: cli.config,
        lexicon_dirs: cli.lexicon_dirs,
        no_follow_refs: cli.no_follow_refs,
    };

    let result = match cli.command {
        Commands::Compile(args) => run_compile(&args, &global),
        Commands::Validate(args) => run_validate(&args, &global),
        Commands::Paths(args) => run_paths(&args, &global),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
