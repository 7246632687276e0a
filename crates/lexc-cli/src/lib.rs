//! # lexc-cli — Lexicon Compiler CLI
//!
//! Provides the `lexc` command-line interface over `lexc-schema`.
//!
//! ## Subcommands
//!
//! - `lexc compile` — Compile a Lexicon and summarize its definitions and
//!   facets, optionally exporting them as JSON Schema.
//! - `lexc validate` — Check an instance document against one facet of a
//!   compiled definition.
//! - `lexc paths` — List every override address of a Lexicon.
//!
//! ```bash
//! lexc --lexicons lexicons/ compile lexicons/app/post.json --json-schema
//! lexc --config lexc.yaml validate post.json --def main record.json
//! lexc paths post.json
//! ```
//!
//! Exit codes: 0 success, 1 validation failure or operational error.

pub mod compile;
pub mod config;
pub mod paths;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lexc_core::LexiconDoc;
use lexc_schema::{CompileOptions, LexiconCatalog, LexiconDict};

use crate::config::CliConfig;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Config file (`--config`).
    pub config: Option<PathBuf>,
    /// Extra lexicon directories (`--lexicons`), loaded after the config's.
    pub lexicon_dirs: Vec<PathBuf>,
    /// Treat every reference as accept-anything (`--no-follow-refs`).
    pub no_follow_refs: bool,
}

impl GlobalOptions {
    pub fn load_config(&self) -> Result<CliConfig> {
        match &self.config {
            Some(path) => CliConfig::load(path),
            None => Ok(CliConfig::default()),
        }
    }

    /// Load the config and every lexicon directory, and assemble the
    /// compile options.
    pub fn compile_options(&self) -> Result<CompileOptions> {
        let config = self.load_config()?;
        let lexicons = load_dictionary(config.lexicon_dirs.iter().chain(&self.lexicon_dirs))?;
        let follow_refs = !self.no_follow_refs && config.follow_refs.unwrap_or(true);
        tracing::debug!(
            lexicons = lexicons.len(),
            follow_refs,
            paths = config.paths.len(),
            "assembled compile options"
        );
        config.compile_options(lexicons, follow_refs)
    }

    /// The reference dictionary without the rest of the config.
    pub fn lexicons(&self) -> Result<LexiconDict> {
        let config = self.load_config()?;
        load_dictionary(config.lexicon_dirs.iter().chain(&self.lexicon_dirs))
    }
}

fn load_dictionary<'a>(dirs: impl Iterator<Item = &'a PathBuf>) -> Result<LexiconDict> {
    let mut catalog = LexiconCatalog::new();
    for dir in dirs {
        catalog
            .add_dir(dir)
            .with_context(|| format!("failed to load lexicons from {}", dir.display()))?;
    }
    tracing::info!(count = catalog.len(), "loaded lexicon catalog");
    Ok(catalog.into_dict())
}

/// Read the Lexicon document to operate on.
pub fn load_lexicon(path: &Path) -> Result<LexiconDoc> {
    lexc_schema::catalog::load_file(path)
        .with_context(|| format!("failed to load lexicon {}", path.display()))
}
