//! # Compile Context
//!
//! State threaded as `&mut` through one compile call: the merged type
//! registry, the lexicon dictionary, the override table (which the object
//! compiler writes required flags into), the metadata side table and the
//! stack of definitions under resolution.
//!
//! Properties and union branches are compiled strictly in declaration
//! order, so every write to the override table is visible to the
//! compilations that follow it.

use std::sync::Arc;

use lexc_core::{LexRef, LexiconDoc};
use serde_json::{Map, Value};

use crate::error::CompileError;
use crate::options::{
    CompileOptions, ConstPolicy, CyclePolicy, LexiconDict, MetadataTable, Override,
    PathOptionTable,
};
use crate::registry::TypeRegistry;

/// Mutable state of one compilation.
#[derive(Debug)]
pub struct CompileContext {
    registry: TypeRegistry,
    lexicons: Arc<LexiconDict>,
    follow_refs: bool,
    cycle_policy: CyclePolicy,
    const_policy: ConstPolicy,
    path_options: PathOptionTable,
    metadata: MetadataTable,
    /// Definitions being compiled, outermost first.
    scope: Vec<LexRef>,
}

impl CompileContext {
    pub fn new(options: CompileOptions) -> Self {
        let CompileOptions {
            follow_refs,
            registry_overrides,
            lexicons,
            path_options,
            cycle_policy,
            const_policy,
        } = options;
        Self {
            registry: TypeRegistry::builtin().merged_with(&registry_overrides),
            lexicons: Arc::new(lexicons),
            follow_refs,
            cycle_policy,
            const_policy,
            path_options,
            metadata: MetadataTable::new(),
            scope: Vec::new(),
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn follow_refs(&self) -> bool {
        self.follow_refs
    }

    pub fn const_policy(&self) -> ConstPolicy {
        self.const_policy
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy
    }

    /// Shared handle on the dictionary, usable while `self` is borrowed
    /// mutably.
    pub fn lexicons(&self) -> Arc<LexiconDict> {
        Arc::clone(&self.lexicons)
    }

    /// Add `doc` to the dictionary unless a document with its id is
    /// already there.
    pub fn register_document(&mut self, doc: &LexiconDoc) {
        let Some(id) = doc.id.as_deref() else {
            return;
        };
        if !self.lexicons.contains_key(id) {
            Arc::make_mut(&mut self.lexicons).insert(id.to_string(), doc.clone());
        }
    }

    // -- override table -----------------------------------------------------

    pub fn path_options(&self) -> &PathOptionTable {
        &self.path_options
    }

    pub fn path_options_mut(&mut self) -> &mut PathOptionTable {
        &mut self.path_options
    }

    pub fn has_override(&self, path: &str) -> bool {
        self.path_options.override_at(path).is_some()
    }

    pub fn override_at(&self, path: &str) -> Option<Override> {
        self.path_options.override_at(path).cloned()
    }

    // -- metadata -----------------------------------------------------------

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    /// Merge `entries` into the metadata of `path`; later keys win.
    pub fn record_metadata(&mut self, path: &str, entries: Map<String, Value>) {
        self.metadata
            .entry(path.to_string())
            .or_default()
            .extend(entries);
    }

    // -- scope --------------------------------------------------------------

    /// The definition currently being compiled.
    pub fn current(&self) -> Option<&LexRef> {
        self.scope.last()
    }

    /// Resolve a reference string against the current document.
    pub fn qualify(&self, reference: &str) -> LexRef {
        let base = self.current().map(LexRef::nsid).unwrap_or_default();
        LexRef::parse(reference).with_base(base)
    }

    /// Enter a top-level definition.
    pub fn enter_scope(&mut self, def: LexRef) {
        self.scope.push(def);
    }

    pub fn exit_scope(&mut self) {
        self.scope.pop();
    }

    /// Enter a reference target. Returns `Ok(false)` when the target is
    /// already under resolution and the cycle policy is permissive; the
    /// scope is then left unchanged.
    pub fn enter_ref(&mut self, target: &LexRef) -> Result<bool, CompileError> {
        if !self.scope.contains(target) {
            self.scope.push(target.clone());
            return Ok(true);
        }
        match self.cycle_policy {
            CyclePolicy::Permissive => Ok(false),
            CyclePolicy::Fail => {
                let chain = self
                    .scope
                    .iter()
                    .chain(std::iter::once(target))
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                Err(CompileError::ReferenceCycle { chain })
            }
        }
    }

    /// Finish compiling the target entered last.
    pub fn exit_ref(&mut self) {
        self.scope.pop();
    }

    /// Consume the context, returning the final override and metadata
    /// tables.
    pub fn into_tables(self) -> (PathOptionTable, MetadataTable) {
        (self.path_options, self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_refs_qualify_against_current_document() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        assert_eq!(ctx.qualify("#a").nsid(), "");
        ctx.enter_scope(LexRef::new("com.example.doc", "main"));
        let r = ctx.qualify("#a");
        assert_eq!(r.nsid(), "com.example.doc");
        assert_eq!(r.def_key(), "a");
        assert_eq!(ctx.qualify("com.other#b").nsid(), "com.other");
    }

    #[test]
    fn cycle_fails_with_chain() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        ctx.enter_scope(LexRef::new("a", "main"));
        assert!(ctx.enter_ref(&LexRef::new("b", "main")).unwrap());
        let err = ctx.enter_ref(&LexRef::new("a", "main")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "reference cycle: a#main -> b#main -> a#main"
        );
    }

    #[test]
    fn permissive_cycle_reports_back_edge() {
        let options = CompileOptions::default().cycle_policy(CyclePolicy::Permissive);
        let mut ctx = CompileContext::new(options);
        ctx.enter_scope(LexRef::new("a", "main"));
        assert!(!ctx.enter_ref(&LexRef::new("a", "main")).unwrap());
        assert_eq!(ctx.current(), Some(&LexRef::new("a", "main")));
    }

    #[test]
    fn metadata_merges_per_path() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        let mut first = Map::new();
        first.insert("a".into(), Value::from(1));
        let mut second = Map::new();
        second.insert("a".into(), Value::from(2));
        second.insert("b".into(), Value::from(3));
        ctx.record_metadata("p", first);
        ctx.record_metadata("p", second);
        assert_eq!(ctx.metadata()["p"]["a"], 2);
        assert_eq!(ctx.metadata()["p"]["b"], 3);
    }
}
