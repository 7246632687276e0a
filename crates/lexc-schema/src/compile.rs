//! # Lexicon Compilation
//!
//! Entry points: [`compile_lexicon`] compiles every definition of a
//! document, [`compile_partial`] compiles a single definition body that
//! carries no `type` field, the way the per-type compilers are used on
//! fragments.

use lexc_core::{LexDef, LexRef, LexiconDoc, OrderedMap};
use lexc_validator::Validator;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::options::{CompileOptions, MetadataTable, Override, PathOptionTable};
use crate::primary::{compile_primary, CompiledDef};
use crate::types::compile_extended;

/// The result of compiling a document.
#[derive(Debug, Clone)]
pub struct CompiledLexicon {
    pub id: Option<String>,
    /// Compiled definitions in declaration order. Omitted definitions are
    /// absent.
    pub defs: OrderedMap<CompiledDef>,
    /// Metadata recorded per address.
    pub metadata: MetadataTable,
    /// The override table after compilation, inferred required flags
    /// included.
    pub path_options: PathOptionTable,
}

impl CompiledLexicon {
    pub fn def(&self, key: &str) -> Option<&CompiledDef> {
        self.defs.get(key)
    }

    pub fn metadata_at(&self, path: &str) -> Option<&Map<String, Value>> {
        self.metadata.get(path)
    }
}

/// Compile every definition of `doc`.
///
/// Top-level definitions live at their own key: an override for `main`
/// omits or replaces the whole `main` definition. The document itself is
/// added to the dictionary (unless one with the same id is already there)
/// so that `#local` references resolve.
pub fn compile_lexicon(
    doc: &LexiconDoc,
    options: CompileOptions,
) -> Result<CompiledLexicon, CompileError> {
    let mut ctx = CompileContext::new(options);
    ctx.register_document(doc);
    let nsid = doc.id.clone().unwrap_or_default();

    let mut defs = OrderedMap::new();
    for (key, def) in doc.defs.iter() {
        match ctx.override_at(key) {
            Some(Override::Omit) => {
                debug!(nsid = nsid.as_str(), def = key, "definition omitted");
                continue;
            }
            Some(Override::Replace(validator)) => {
                debug!(nsid = nsid.as_str(), def = key, "definition replaced");
                defs.insert(key, CompiledDef::Schema(validator));
                continue;
            }
            None => {}
        }

        debug!(nsid = nsid.as_str(), def = key, tag = def.type_tag(), "compiling definition");
        ctx.enter_scope(LexRef::new(nsid.as_str(), key));
        let compiled = compile_definition(def, key, &mut ctx);
        ctx.exit_scope();
        defs.insert(key, compiled?);
    }

    let (path_options, metadata) = ctx.into_tables();
    Ok(CompiledLexicon {
        id: doc.id.clone(),
        defs,
        metadata,
        path_options,
    })
}

/// Compile one definition at `path`: primary envelopes to their facet
/// maps, everything else through the registry.
pub fn compile_definition(
    def: &LexDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<CompiledDef, CompileError> {
    if let Some(primary) = compile_primary(def, path, ctx)? {
        return Ok(primary);
    }
    Ok(CompiledDef::Schema(compile_extended(def, path, ctx)?))
}

/// Compile a definition body as if it were declared with type `tag`, at
/// the root address.
pub fn compile_partial(
    tag: &str,
    partial: Value,
    options: CompileOptions,
) -> Result<CompiledDef, CompileError> {
    let mut body = match partial {
        Value::Object(body) => body,
        Value::Null => Map::new(),
        _ => {
            return Err(CompileError::MalformedDefinition {
                path: String::new(),
                source: lexc_core::LexiconError::NotAnObject {
                    found: "non-object",
                },
            })
        }
    };
    body.insert("type".to_string(), Value::String(tag.to_string()));
    let def = LexDef::from_value(Value::Object(body))?;
    trace!(tag, "compiling partial definition");
    let mut ctx = CompileContext::new(options);
    compile_definition(&def, "", &mut ctx)
}

/// [`compile_partial`] for definitions that compile to a single validator.
pub fn compile_partial_schema(
    tag: &str,
    partial: Value,
    options: CompileOptions,
) -> Result<Validator, CompileError> {
    match compile_partial(tag, partial, options)? {
        CompiledDef::Schema(v) => Ok(v),
        other => Err(CompileError::UnsupportedType {
            type_tag: other.kind_name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::PathOptions;
    use serde_json::json;

    #[test]
    fn partial_string_with_const_default() {
        let v = compile_partial_schema(
            "string",
            json!({ "const": "defaultValue" }),
            CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(v.parse_field(None).unwrap(), Some(json!("defaultValue")));
        assert!(v.accepts(&json!("anything")));
    }

    #[test]
    fn partial_object_with_root_level_overrides() {
        let options = CompileOptions::new().with_path_options("name", PathOptions::omit());
        let v = compile_partial_schema(
            "object",
            json!({
                "required": ["name"],
                "properties": {
                    "name": { "type": "string" },
                    "age": { "type": "integer" }
                }
            }),
            options,
        )
        .unwrap();
        assert_eq!(v.field_keys(), vec!["age"]);
    }

    #[test]
    fn partial_record_gives_facets() {
        let compiled = compile_partial(
            "record",
            json!({ "key": "tid", "record": { "properties": {} } }),
            CompileOptions::default(),
        )
        .unwrap();
        assert_eq!(compiled.kind_name(), "record");
        assert!(compiled.facet("key").unwrap().accepts(&json!("tid")));
        assert!(compile_partial_schema("record", json!({}), CompileOptions::default()).is_err());
    }

    #[test]
    fn partial_rejects_non_objects() {
        let err = compile_partial("string", json!(3), CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::MalformedDefinition { .. }));
    }
}
