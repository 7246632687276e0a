//! # Paths Subcommand
//!
//! Lists the override addresses of a Lexicon in compilation order, as a
//! starting point for the `paths:` section of a config file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lexc_schema::{outline, PathEntry};

use crate::{load_lexicon, GlobalOptions};

/// Arguments for the `lexc paths` subcommand.
#[derive(Args, Debug)]
pub struct PathsArgs {
    /// Lexicon file (JSON or YAML).
    #[arg(value_name = "LEXICON")]
    pub lexicon: PathBuf,

    /// Print JSON instead of aligned text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the paths subcommand.
pub fn run_paths(args: &PathsArgs, global: &GlobalOptions) -> Result<u8> {
    let doc = load_lexicon(&args.lexicon)?;
    let lexicons = if global.no_follow_refs {
        Default::default()
    } else {
        global.lexicons()?
    };
    let entries = outline(&doc, &lexicons);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("{}", render(&entries));
    }
    Ok(0)
}

/// Aligned `path  type  [ref]` lines.
pub fn render(entries: &[PathEntry]) -> String {
    let width = entries.iter().map(|e| e.path.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| match &e.reference {
            Some(reference) => format!("{:width$}  {} -> {}", e.path, e.type_tag, reference),
            None => format!("{:width$}  {}", e.path, e.type_tag),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
