//! # Lexicon Catalog
//!
//! Loads Lexicon documents from a directory tree so they can serve as the
//! reference dictionary of a compilation. `*.json`, `*.yaml` and `*.yml`
//! files are read; each document is keyed by its `id`. Documents without
//! an id cannot be referenced and are skipped with a warning.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lexc_core::LexiconDoc;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CompileError;
use crate::options::LexiconDict;

/// Lexicon documents indexed by NSID.
#[derive(Debug, Clone, Default)]
pub struct LexiconCatalog {
    docs: BTreeMap<String, LexiconDoc>,
    /// Source file of each document.
    sources: BTreeMap<String, PathBuf>,
}

impl LexiconCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every Lexicon file below `dir`, recursing into subdirectories.
    ///
    /// # Errors
    ///
    /// `CatalogLoad` if the directory cannot be read, a file does not
    /// parse, or two files declare the same id.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, CompileError> {
        let mut catalog = Self::new();
        catalog.add_dir(dir.as_ref())?;
        Ok(catalog)
    }

    /// Add every Lexicon file below `dir`.
    pub fn add_dir(&mut self, dir: &Path) -> Result<(), CompileError> {
        let entries = std::fs::read_dir(dir).map_err(|e| CompileError::CatalogLoad {
            path: dir.display().to_string(),
            reason: format!("cannot read lexicon directory: {e}"),
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.add_dir(&path)?;
            } else if is_lexicon_file(&path) {
                let doc = load_file(&path)?;
                self.insert(doc, &path)?;
            }
        }
        Ok(())
    }

    fn insert(&mut self, doc: LexiconDoc, path: &Path) -> Result<(), CompileError> {
        let Some(id) = doc.id.clone() else {
            warn!(path = %path.display(), "skipping lexicon without an id");
            return Ok(());
        };
        if let Some(previous) = self.sources.get(&id) {
            return Err(CompileError::CatalogLoad {
                path: path.display().to_string(),
                reason: format!("duplicate lexicon id '{id}' (first seen in {})", previous.display()),
            });
        }
        debug!(nsid = id.as_str(), path = %path.display(), "loaded lexicon");
        self.sources.insert(id.clone(), path.to_path_buf());
        self.docs.insert(id, doc);
        Ok(())
    }

    pub fn get(&self, nsid: &str) -> Option<&LexiconDoc> {
        self.docs.get(nsid)
    }

    /// File a document was loaded from.
    pub fn source(&self, nsid: &str) -> Option<&Path> {
        self.sources.get(nsid).map(PathBuf::as_path)
    }

    pub fn nsids(&self) -> Vec<&str> {
        self.docs.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn into_dict(self) -> LexiconDict {
        self.docs
    }
}

fn is_lexicon_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json" | "yaml" | "yml")
    )
}

/// Read one Lexicon document from a JSON or YAML file.
pub fn load_file(path: &Path) -> Result<LexiconDoc, CompileError> {
    let content = std::fs::read_to_string(path)?;
    let load_error = |reason: String| CompileError::CatalogLoad {
        path: path.display().to_string(),
        reason,
    };

    let value = parse_value(path, &content).map_err(load_error)?;
    LexiconDoc::from_value(value).map_err(|e| load_error(e.to_string()))
}

/// Parse JSON or YAML text into a JSON value tree, choosing the syntax by
/// the file extension of `path`. YAML mappings keep their key order.
pub fn parse_value(path: &Path, content: &str) -> Result<Value, String> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            serde_yaml::from_str(content).map_err(|e| format!("invalid YAML: {e}"))
        }
        _ => serde_json::from_str(content).map_err(|e| format!("invalid JSON: {e}")),
    }
}
