//! # Node Compilers
//!
//! One compiler per non-primary definition type. Each is a plain function
//! taking its typed definition, the node's address and the compile
//! context, so it can be invoked on its own as well as through the
//! registry. [`entry`] adapts a typed compiler to the registry's
//! `&LexDef` signature: a definition of the matching variant is borrowed,
//! anything else (a custom tag routed to a built-in compiler, say) is
//! re-read as the expected shape.
//!
//! Compilers return the bare validator for their node. [`compile_node`]
//! is the single place where the override table is consulted and where
//! the node is extended: an omitted node yields `None`, a replacement is
//! returned verbatim, everything else is dispatched by tag and then
//! extended once with its description, default, required flag and
//! metadata. Caller-registered compilers get the same treatment.

pub mod array;
pub mod leaf;
pub mod object;
pub mod reference;
pub mod union;

use std::borrow::Cow;

use lexc_core::{
    ArrayDef, BlobDef, BooleanDef, BytesDef, CidLinkDef, IntegerDef, LexDef, NullDef, ObjectDef,
    RefDef, StringDef, TokenDef, UnionDef, UnknownDef,
};
use lexc_validator::Validator;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::extend::extend_schema;
use crate::options::Override;

/// A typed definition that can be borrowed out of a [`LexDef`].
pub trait DefVariant: Clone + DeserializeOwned {
    fn borrow_from(def: &LexDef) -> Option<&Self>;
}

macro_rules! def_variant {
    ($ty:ty => $($variant:ident)|+) => {
        impl DefVariant for $ty {
            fn borrow_from(def: &LexDef) -> Option<&Self> {
                match def {
                    $(LexDef::$variant(d) => Some(d),)+
                    _ => None,
                }
            }
        }
    };
}

def_variant!(ObjectDef => Object | Params);
def_variant!(ArrayDef => Array);
def_variant!(StringDef => String);
def_variant!(IntegerDef => Integer);
def_variant!(BooleanDef => Boolean);
def_variant!(BlobDef => Blob);
def_variant!(BytesDef => Bytes);
def_variant!(CidLinkDef => CidLink);
def_variant!(NullDef => Null);
def_variant!(UnknownDef => Unknown);
def_variant!(TokenDef => Token);
def_variant!(RefDef => Ref);
def_variant!(UnionDef => Union);

/// View `def` as a `T`, borrowing when the variant already matches.
pub fn variant<'a, T: DefVariant>(def: &'a LexDef, path: &str) -> Result<Cow<'a, T>, CompileError> {
    match T::borrow_from(def) {
        Some(typed) => Ok(Cow::Borrowed(typed)),
        None => def
            .reinterpret::<T>()
            .map(Cow::Owned)
            .map_err(|source| CompileError::MalformedDefinition {
                path: path.to_string(),
                source,
            }),
    }
}

/// Adapt a typed compiler to the registry signature.
pub fn entry<T, F>(
    compile: F,
) -> impl Fn(&LexDef, &str, &mut CompileContext) -> Result<Validator, CompileError> + Send + Sync + 'static
where
    T: DefVariant + 'static,
    F: Fn(&T, &str, &mut CompileContext) -> Result<Validator, CompileError> + Send + Sync + 'static,
{
    move |def: &LexDef, path: &str, ctx: &mut CompileContext| {
        let typed = variant::<T>(def, path)?;
        compile(&typed, path, ctx)
    }
}

/// Compile the node at `path`, honouring the override table. `None` means
/// the caller should drop the node.
pub fn compile_node(
    def: &LexDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Option<Validator>, CompileError> {
    match ctx.override_at(path) {
        Some(Override::Omit) => {
            trace!(path, "node omitted by override");
            Ok(None)
        }
        Some(Override::Replace(validator)) => {
            trace!(path, "node replaced by override");
            Ok(Some(validator))
        }
        None => compile_extended(def, path, ctx).map(Some),
    }
}

/// [`dispatch`], then extend the result at `path`.
pub fn compile_extended(
    def: &LexDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let validator = dispatch(def, path, ctx)?;
    Ok(extend_schema(
        validator,
        def.description(),
        def.default_value(),
        path,
        ctx,
    ))
}

/// Compile `def` through the registry, without consulting overrides or
/// extending the result.
pub fn dispatch(def: &LexDef, path: &str, ctx: &mut CompileContext) -> Result<Validator, CompileError> {
    let tag = def.type_tag();
    if !ctx.registry().contains(tag) {
        warn!(path, tag, "no compiler registered, falling back to $default");
    }
    let compiler = ctx.registry().resolve(tag, false)?;
    trace!(path, tag, "compiling node");
    compiler(def, path, ctx)
}
