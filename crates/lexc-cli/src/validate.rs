//! # Validate Subcommand
//!
//! Parses an instance document (JSON or YAML) with one facet of a
//! compiled definition. On success the parse output, with defaults and
//! coercions applied, is printed; on failure every violation is printed
//! and the exit code is 1.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use lexc_schema::{compile_lexicon, CompiledDef};
use lexc_validator::Validator;
use serde_json::Value;

use crate::{load_lexicon, GlobalOptions};

/// Arguments for the `lexc validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Lexicon file (JSON or YAML).
    #[arg(value_name = "LEXICON")]
    pub lexicon: PathBuf,

    /// Definition to validate against.
    #[arg(long, default_value = lexc_core::MAIN_DEF)]
    pub def: String,

    /// Facet of a record/query/procedure/subscription, e.g.
    /// `output.schema`. Records default to `record`.
    #[arg(long)]
    pub facet: Option<String>,

    /// Instance document (JSON or YAML).
    #[arg(value_name = "INSTANCE")]
    pub instance: PathBuf,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when the instance is accepted, 1 when rejected.
pub fn run_validate(args: &ValidateArgs, global: &GlobalOptions) -> Result<u8> {
    let doc = load_lexicon(&args.lexicon)?;
    let compiled = compile_lexicon(&doc, global.compile_options()?)
        .with_context(|| format!("failed to compile {}", args.lexicon.display()))?;
    let Some(def) = compiled.def(&args.def) else {
        bail!(
            "definition '{}' not found; available: {}",
            args.def,
            compiled.defs.keys().collect::<Vec<_>>().join(", ")
        );
    };
    let validator = select_facet(def, args.facet.as_deref())?;
    let instance = load_instance(&args.instance)?;

    match validator.parse(&instance) {
        Ok(output) => {
            println!("OK: {}", args.instance.display());
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(0)
        }
        Err(e) => {
            println!("FAIL: {}", args.instance.display());
            println!("{}", e.violations);
            Ok(1)
        }
    }
}

/// Pick the validator for `facet`, defaulting to the whole definition
/// (plain schemas) or the record body (records).
pub fn select_facet<'a>(def: &'a CompiledDef, facet: Option<&str>) -> Result<&'a Validator> {
    let name = match (facet, def) {
        (Some(name), _) => name,
        (None, CompiledDef::Schema(_)) => "",
        (None, CompiledDef::Record(_)) => "record",
        (None, other) => bail!(
            "{} definitions need --facet (one of: {})",
            other.kind_name(),
            other.facet_paths().join(", ")
        ),
    };
    def.facet(name).with_context(|| {
        format!(
            "{} definition has no facet '{name}' (available: {})",
            def.kind_name(),
            def.facet_paths().join(", ")
        )
    })
}

fn load_instance(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read instance {}", path.display()))?;
    lexc_schema::catalog::parse_value(path, &content)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("failed to parse instance {}", path.display()))
}
