//! # Configuration File
//!
//! `lexc --config <file>` reads compile settings from YAML or JSON
//! (chosen by extension, YAML otherwise):
//!
//! ```yaml
//! follow_refs: true
//! lexicon_dirs: [lexicons]
//! cycle_policy: fail          # or: permissive
//! const_policy: default       # or: enforce
//! paths:
//!   main.record.langs:
//!     omit: true
//!   main.record.text:
//!     required: false
//!     metadata: { label: "Post text" }
//!   main.record.createdAt:
//!     override: { type: string, format: datetime, minLength: 20 }
//!   main.record:
//!     additional_props:
//!       draft: { type: boolean }
//! ```
//!
//! `override` and `additional_props` values are Lexicon definitions,
//! compiled on their own into the validators placed at those addresses.
//! Relative `lexicon_dirs` are resolved against the config file's
//! directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lexc_core::{LexDef, OrderedMap};
use lexc_schema::{
    compile_partial_schema, CompileOptions, ConstPolicy, CyclePolicy, LexiconDict, PathOptions,
};
use lexc_validator::Validator;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Parsed configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub follow_refs: Option<bool>,
    pub lexicon_dirs: Vec<PathBuf>,
    pub cycle_policy: CyclePolicy,
    pub const_policy: ConstPolicy,
    pub paths: BTreeMap<String, PathConfig>,
}

/// Options for one address.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathConfig {
    pub omit: bool,
    pub required: Option<bool>,
    pub metadata: Option<Map<String, Value>>,
    #[serde(rename = "override")]
    pub override_def: Option<Value>,
    pub additional_props: OrderedMap<Value>,
}

impl CliConfig {
    /// Read a config file. Relative `lexicon_dirs` are made relative to
    /// the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON config {}", path.display()))?,
            _ => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML config {}", path.display()))?,
        };
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.lexicon_dirs = config
            .lexicon_dirs
            .into_iter()
            .map(|dir| if dir.is_absolute() { dir } else { base.join(dir) })
            .collect();
        Ok(config)
    }

    /// Build compile options over an already loaded dictionary.
    pub fn compile_options(&self, lexicons: LexiconDict, follow_refs: bool) -> Result<CompileOptions> {
        let mut options = CompileOptions::new()
            .follow_refs(follow_refs)
            .cycle_policy(self.cycle_policy)
            .const_policy(self.const_policy);
        options.lexicons = lexicons;

        for (path, entry) in &self.paths {
            let path_options = entry
                .to_path_options(&options)
                .with_context(|| format!("invalid options for path '{path}'"))?;
            options.path_options.insert(path.clone(), path_options);
        }
        Ok(options)
    }
}

impl PathConfig {
    fn to_path_options(&self, base: &CompileOptions) -> Result<PathOptions> {
        let mut options = if self.omit {
            PathOptions::omit()
        } else if let Some(def) = &self.override_def {
            let mut replacement = compile_standalone(def, base)?;
            if self.required == Some(true) {
                replacement = replacement.required();
            }
            PathOptions::replace(replacement)
        } else {
            PathOptions::new()
        };
        options.is_required = self.required;
        options.metadata = self.metadata.clone();
        for (key, def) in self.additional_props.iter() {
            let field = compile_standalone(def, base)
                .with_context(|| format!("invalid additional property '{key}'"))?;
            options.additional_props.push((key.to_string(), field));
        }
        Ok(options)
    }
}

/// Compile a definition written inline in the config, resolving its
/// references against the same dictionary as the main compilation.
fn compile_standalone(def: &Value, base: &CompileOptions) -> Result<Validator> {
    let tag = LexDef::from_value(def.clone())
        .context("override is not a Lexicon definition")?
        .type_tag()
        .to_string();
    let options = CompileOptions::new()
        .follow_refs(base.follow_refs)
        .cycle_policy(base.cycle_policy)
        .const_policy(base.const_policy)
        .with_lexicons(base.lexicons.values().cloned());
    compile_partial_schema(&tag, def.clone(), options)
        .with_context(|| format!("failed to compile '{tag}' override"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexc_schema::Override;
    use serde_json::json;

    const CONFIG: &str = r#"
follow_refs: false
lexicon_dirs: [lexicons]
cycle_policy: permissive
paths:
  main.record.langs:
    omit: true
  main.record.text:
    required: false
    metadata: { label: "Post text" }
  main.record.createdAt:
    required: true
    override: { type: string, minLength: 20 }
  main.record:
    additional_props:
      draft: { type: boolean }
"#;

    #[test]
    fn parses_yaml_and_builds_options() {
        let config: CliConfig = serde_yaml::from_str(CONFIG).unwrap();
        assert_eq!(config.follow_refs, Some(false));
        assert_eq!(config.cycle_policy, CyclePolicy::Permissive);
        let options = config.compile_options(LexiconDict::new(), false).unwrap();
        assert_eq!(options.cycle_policy, CyclePolicy::Permissive);

        let table = &options.path_options;
        assert_eq!(table.override_at("main.record.langs"), Some(&Override::Omit));
        assert_eq!(table.is_required("main.record.text"), Some(false));
        assert_eq!(
            table.get("main.record.text").unwrap().metadata.as_ref().unwrap()["label"],
            "Post text"
        );
        match table.override_at("main.record.createdAt") {
            Some(Override::Replace(v)) => {
                assert!(v.accepts(&json!("2024-01-01T00:00:00.000Z")));
                assert!(!v.accepts(&json!("short")));
                assert!(v.parse_field(None).is_err());
            }
            other => panic!("expected a replacement, got {other:?}"),
        }
        let extra = &table.get("main.record").unwrap().additional_props;
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].0, "draft");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<CliConfig, _> = serde_yaml::from_str("folow_refs: true\n");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_override_names_the_path() {
        let config: CliConfig =
            serde_yaml::from_str("paths:\n  a:\n    override: { type: ref }\n").unwrap();
        let err = config.compile_options(LexiconDict::new(), true).unwrap_err();
        assert!(format!("{err:#}").contains("'a'"));
    }
}
