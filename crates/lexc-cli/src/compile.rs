//! # Compile Subcommand
//!
//! Compiles one Lexicon and prints a summary of its definitions, or with
//! `--json-schema` a JSON document mapping each definition's facets to
//! their JSON Schema export.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use lexc_schema::{compile_lexicon, CompiledLexicon};
use serde_json::{Map, Value};

use crate::{load_lexicon, GlobalOptions};

/// Arguments for the `lexc compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Lexicon file (JSON or YAML).
    #[arg(value_name = "LEXICON")]
    pub lexicon: PathBuf,

    /// Print the JSON Schema export instead of a summary.
    #[arg(long)]
    pub json_schema: bool,

    /// Write output to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Execute the compile subcommand.
pub fn run_compile(args: &CompileArgs, global: &GlobalOptions) -> Result<u8> {
    let doc = load_lexicon(&args.lexicon)?;
    let options = global.compile_options()?;
    let compiled = compile_lexicon(&doc, options)
        .with_context(|| format!("failed to compile {}", args.lexicon.display()))?;
    tracing::info!(defs = compiled.defs.len(), "compiled lexicon");

    let rendered = if args.json_schema {
        serde_json::to_string_pretty(&json_schema_export(&compiled))?
    } else {
        summary(&compiled)
    };

    match &args.output {
        Some(path) => std::fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(0)
}

/// `{ <def>: { <facet>: <schema> } }`; plain definitions map straight to
/// their schema.
pub fn json_schema_export(compiled: &CompiledLexicon) -> Value {
    let mut defs = Map::new();
    for (key, def) in compiled.defs.iter() {
        let exported = match def.as_schema() {
            Some(schema) => schema.to_json_schema(),
            None => Value::Object(
                def.facets()
                    .into_iter()
                    .map(|(facet, v)| (facet.to_string(), v.to_json_schema()))
                    .collect(),
            ),
        };
        defs.insert(key.to_string(), exported);
    }
    Value::Object(defs)
}

/// One line per definition: key, kind and facets.
pub fn summary(compiled: &CompiledLexicon) -> String {
    let mut lines = vec![format!(
        "{} ({} definitions)",
        compiled.id.as_deref().unwrap_or("<anonymous>"),
        compiled.defs.len()
    )];
    for (key, def) in compiled.defs.iter() {
        let facets = def
            .facet_paths()
            .into_iter()
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>();
        if facets.is_empty() {
            lines.push(format!("  {key}: {}", def.kind_name()));
        } else {
            lines.push(format!("  {key}: {} [{}]", def.kind_name(), facets.join(", ")));
        }
    }
    lines.join("\n")
}
