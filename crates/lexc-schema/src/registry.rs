//! # Type Dispatch Registry
//!
//! Maps a definition's `type` tag to the compiler that turns it into a
//! [`Validator`]. The built-in table covers every non-primary Lexicon
//! type plus `$default`, the accept-anything fallback used by non-strict
//! lookups. Callers can register their own entries for any tag, the
//! composite `object`, `array`, `union` and `ref` compilers included;
//! [`TypeRegistry::merged_with`] gives caller entries precedence.
//!
//! Record, query, procedure and subscription envelopes produce facet maps
//! rather than a single validator and are compiled by [`crate::primary`],
//! outside this table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lexc_core::LexDef;
use lexc_validator::Validator;

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::types::{self, array, leaf, object, reference, union};

/// Registry key of the fallback compiler.
pub const DEFAULT_TAG: &str = "$default";

/// A type compiler: definition, address, context in; validator out.
pub type TypeCompiler =
    Arc<dyn Fn(&LexDef, &str, &mut CompileContext) -> Result<Validator, CompileError> + Send + Sync>;

/// Tag → compiler table.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    compilers: BTreeMap<String, TypeCompiler>,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in compilers.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_TAG, |_: &LexDef, _: &str, _: &mut CompileContext| {
            Ok(Validator::any())
        });
        registry.register("string", types::entry(leaf::compile_string));
        registry.register("integer", types::entry(leaf::compile_integer));
        registry.register("boolean", types::entry(leaf::compile_boolean));
        registry.register("null", types::entry(leaf::compile_null));
        registry.register("unknown", types::entry(leaf::compile_unknown));
        registry.register("blob", types::entry(leaf::compile_blob));
        registry.register("bytes", types::entry(leaf::compile_bytes));
        registry.register("cid-link", types::entry(leaf::compile_cid_link));
        registry.register("token", types::entry(leaf::compile_token));
        registry.register("array", types::entry(array::compile_array));
        registry.register("object", types::entry(object::compile_object));
        registry.register("params", types::entry(object::compile_object));
        registry.register("union", types::entry(union::compile_union));
        registry.register("ref", types::entry(reference::compile_ref));
        registry
    }

    /// Register `compiler` for `tag`, replacing any previous entry.
    pub fn register<F>(&mut self, tag: impl Into<String>, compiler: F)
    where
        F: Fn(&LexDef, &str, &mut CompileContext) -> Result<Validator, CompileError>
            + Send
            + Sync
            + 'static,
    {
        self.compilers.insert(tag.into(), Arc::new(compiler));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, tag: impl Into<String>, compiler: F) -> Self
    where
        F: Fn(&LexDef, &str, &mut CompileContext) -> Result<Validator, CompileError>
            + Send
            + Sync
            + 'static,
    {
        self.register(tag, compiler);
        self
    }

    /// Copy every entry of `overrides` over this registry.
    pub fn merged_with(mut self, overrides: &TypeRegistry) -> Self {
        for (tag, compiler) in &overrides.compilers {
            self.compilers.insert(tag.clone(), Arc::clone(compiler));
        }
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.compilers.contains_key(tag)
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&str> {
        self.compilers.keys().map(String::as_str).collect()
    }

    /// Find the compiler for `tag`. Non-strict lookups fall back to the
    /// `$default` entry.
    pub fn resolve(&self, tag: &str, strict: bool) -> Result<TypeCompiler, CompileError> {
        if let Some(compiler) = self.compilers.get(tag) {
            return Ok(Arc::clone(compiler));
        }
        if !strict {
            if let Some(fallback) = self.compilers.get(DEFAULT_TAG) {
                return Ok(Arc::clone(fallback));
            }
        }
        Err(CompileError::UnsupportedType {
            type_tag: tag.to_string(),
        })
    }
}
