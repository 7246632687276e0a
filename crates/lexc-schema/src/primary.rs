//! # Primary Envelopes
//!
//! Records, queries, procedures and subscriptions are not single shapes:
//! each compiles to a map of facets (the record body, the query
//! parameters, the output body...). Facets are compiled at fixed
//! addresses below the definition and are always required:
//!
//! | Facet            | Address                  |
//! |------------------|--------------------------|
//! | record body      | `<def>.record`           |
//! | parameters       | `<def>.parameters`       |
//! | input body       | `<def>.input.schema`     |
//! | output body      | `<def>.output.schema`    |
//! | message body     | `<def>.message.schema`   |
//!
//! Pieces the definition does not declare compile to never-match
//! placeholders, so every facet can be looked up on every envelope.

use lexc_core::{
    object_path, BodyDef, ErrorDef, LexDef, MessageDef, ObjectDef, ProcedureDef, QueryDef,
    RecordDef, SubscriptionDef,
};
use lexc_validator::Validator;
use serde_json::Value;

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::extend::extend_schema;
use crate::options::Override;
use crate::types::compile_node;

/// `{ encoding, schema }` of an RPC body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySchema {
    pub encoding: Validator,
    pub schema: Validator,
}

impl BodySchema {
    fn never() -> Self {
        Self {
            encoding: Validator::never(),
            schema: Validator::never(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub key: Validator,
    pub record: Validator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySchema {
    pub parameters: Validator,
    pub output: BodySchema,
    pub errors: Validator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureSchema {
    pub parameters: Validator,
    pub input: BodySchema,
    pub output: BodySchema,
    pub errors: Validator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSchema {
    pub parameters: Validator,
    pub message: Validator,
    pub errors: Validator,
}

/// A compiled top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledDef {
    Schema(Validator),
    Record(RecordSchema),
    Query(QuerySchema),
    Procedure(ProcedureSchema),
    Subscription(SubscriptionSchema),
}

impl CompiledDef {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema",
            Self::Record(_) => "record",
            Self::Query(_) => "query",
            Self::Procedure(_) => "procedure",
            Self::Subscription(_) => "subscription",
        }
    }

    /// The validator of a plain definition.
    pub fn as_schema(&self) -> Option<&Validator> {
        match self {
            Self::Schema(v) => Some(v),
            _ => None,
        }
    }

    /// Every facet with its dotted name. A plain definition has a single
    /// facet named `""`.
    pub fn facets(&self) -> Vec<(&'static str, &Validator)> {
        match self {
            Self::Schema(v) => vec![("", v)],
            Self::Record(r) => vec![("key", &r.key), ("record", &r.record)],
            Self::Query(q) => vec![
                ("parameters", &q.parameters),
                ("output.encoding", &q.output.encoding),
                ("output.schema", &q.output.schema),
                ("errors", &q.errors),
            ],
            Self::Procedure(p) => vec![
                ("parameters", &p.parameters),
                ("input.encoding", &p.input.encoding),
                ("input.schema", &p.input.schema),
                ("output.encoding", &p.output.encoding),
                ("output.schema", &p.output.schema),
                ("errors", &p.errors),
            ],
            Self::Subscription(s) => vec![
                ("parameters", &s.parameters),
                ("message.schema", &s.message),
                ("errors", &s.errors),
            ],
        }
    }

    pub fn facet_paths(&self) -> Vec<&'static str> {
        self.facets().into_iter().map(|(name, _)| name).collect()
    }

    /// Look up a facet by dotted name, e.g. `"output.schema"`.
    pub fn facet(&self, name: &str) -> Option<&Validator> {
        self.facets()
            .into_iter()
            .find(|(facet, _)| *facet == name)
            .map(|(_, v)| v)
    }
}

// ---------------------------------------------------------------------------
// Compilers
// ---------------------------------------------------------------------------

/// Compile `def` if it is a primary envelope; `None` otherwise.
pub fn compile_primary(
    def: &LexDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Option<CompiledDef>, CompileError> {
    Ok(Some(match def {
        LexDef::Record(d) => CompiledDef::Record(compile_record(d, path, ctx)?),
        LexDef::Query(d) => CompiledDef::Query(compile_query(d, path, ctx)?),
        LexDef::Procedure(d) => CompiledDef::Procedure(compile_procedure(d, path, ctx)?),
        LexDef::Subscription(d) => CompiledDef::Subscription(compile_subscription(d, path, ctx)?),
        _ => return Ok(None),
    }))
}

pub fn compile_record(
    def: &RecordDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<RecordSchema, CompileError> {
    Ok(RecordSchema {
        key: literal_or_never(def.key.as_deref()),
        record: object_facet(def.record.as_ref(), &object_path(path, "record"), ctx)?,
    })
}

pub fn compile_query(
    def: &QueryDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<QuerySchema, CompileError> {
    Ok(QuerySchema {
        parameters: object_facet(def.parameters.as_ref(), &object_path(path, "parameters"), ctx)?,
        output: body_facet(def.output.as_ref(), &object_path(path, "output"), ctx)?,
        errors: errors_facet(&def.errors),
    })
}

pub fn compile_procedure(
    def: &ProcedureDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<ProcedureSchema, CompileError> {
    Ok(ProcedureSchema {
        parameters: object_facet(def.parameters.as_ref(), &object_path(path, "parameters"), ctx)?,
        input: body_facet(def.input.as_ref(), &object_path(path, "input"), ctx)?,
        output: body_facet(def.output.as_ref(), &object_path(path, "output"), ctx)?,
        errors: errors_facet(&def.errors),
    })
}

pub fn compile_subscription(
    def: &SubscriptionDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<SubscriptionSchema, CompileError> {
    Ok(SubscriptionSchema {
        parameters: object_facet(def.parameters.as_ref(), &object_path(path, "parameters"), ctx)?,
        message: message_facet(def.message.as_ref(), &object_path(path, "message"), ctx)?,
        errors: errors_facet(&def.errors),
    })
}

fn literal_or_never(value: Option<&str>) -> Validator {
    value.map_or_else(Validator::never, |v| Validator::literal(Value::from(v)))
}

/// One-of the declared error names.
fn errors_facet(errors: &[ErrorDef]) -> Validator {
    if errors.is_empty() {
        return Validator::never();
    }
    Validator::string().one_of_strings(errors.iter().map(|e| e.name.clone()))
}

/// Facet overrides: an omitted facet never matches, a replacement is used
/// as is. Otherwise the facet is marked required and compiled.
fn facet_override(path: &str, ctx: &mut CompileContext) -> Option<Validator> {
    match ctx.override_at(path) {
        Some(Override::Omit) => Some(Validator::never()),
        Some(Override::Replace(v)) => Some(v),
        None => {
            ctx.path_options_mut().mark_required(path);
            None
        }
    }
}

fn object_facet(
    def: Option<&ObjectDef>,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let Some(def) = def else {
        return Ok(Validator::never());
    };
    if let Some(overridden) = facet_override(path, ctx) {
        return Ok(overridden);
    }
    let compile_object = ctx.registry().resolve("object", true)?;
    let object = compile_object(&LexDef::Object(def.clone()), path, ctx)?;
    Ok(extend_schema(object, def.description.as_deref(), None, path, ctx))
}

fn schema_facet(
    schema: Option<&LexDef>,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let Some(schema) = schema else {
        return Ok(Validator::never());
    };
    if !ctx.has_override(path) {
        ctx.path_options_mut().mark_required(path);
    }
    Ok(compile_node(schema, path, ctx)?.unwrap_or_else(Validator::never))
}

fn body_facet(
    def: Option<&BodyDef>,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<BodySchema, CompileError> {
    let Some(body) = def else {
        return Ok(BodySchema::never());
    };
    Ok(BodySchema {
        encoding: literal_or_never(body.encoding.as_deref()),
        schema: schema_facet(body.schema.as_deref(), &object_path(path, "schema"), ctx)?,
    })
}

fn message_facet(
    def: Option<&MessageDef>,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let schema = def.and_then(|m| m.schema.as_deref());
    schema_facet(schema, &object_path(path, "schema"), ctx)
}
