//! # lexc-schema — Lexicon Compiler
//!
//! Compiles a [`LexiconDoc`](lexc_core::LexiconDoc) into a tree of
//! [`Validator`](lexc_validator::Validator)s.
//!
//! ## Compilation (`compile`)
//!
//! [`compile_lexicon`] walks every definition in declaration order.
//! Plain definitions go through the [`TypeRegistry`], which maps each
//! `type` tag to a node compiler in [`types`]; record, query, procedure
//! and subscription envelopes are compiled into facet maps by
//! [`primary`]. References are resolved against the dictionary in
//! [`CompileOptions`] and compiled at the address of the `ref` itself.
//!
//! ## Addressing & Overrides (`options`)
//!
//! Every node has a dotted address (`main.record.embed.__union__.1`).
//! The [`PathOptionTable`] keyed by those addresses lets callers omit or
//! replace nodes, force nodes optional, attach metadata and append
//! properties to objects. [`outline`](outline::outline) lists the
//! addresses of a document.
//!
//! ## Catalog (`catalog`)
//!
//! [`LexiconCatalog`] loads a directory of JSON/YAML Lexicons into a
//! reference dictionary. It is the only part of this crate touching the
//! filesystem.
//!
//! ## Crate Policy
//!
//! - Depends only on `lexc-core` and `lexc-validator` internally.
//! - Any compile error aborts the whole compilation; no partial output.
//! - The override table is the only mutable state, threaded as
//!   `&mut CompileContext`; compilation is single-threaded.

pub mod catalog;
pub mod compile;
pub mod context;
pub mod error;
pub mod extend;
pub mod options;
pub mod outline;
pub mod primary;
pub mod registry;
pub mod types;

pub use catalog::LexiconCatalog;
pub use compile::{
    compile_definition, compile_lexicon, compile_partial, compile_partial_schema, CompiledLexicon,
};
pub use context::CompileContext;
pub use error::CompileError;
pub use options::{
    CompileOptions, ConstPolicy, CyclePolicy, LexiconDict, MetadataTable, Override, PathOptionTable,
    PathOptions,
};
pub use outline::{outline, PathEntry};
pub use primary::{
    BodySchema, CompiledDef, ProcedureSchema, QuerySchema, RecordSchema, SubscriptionSchema,
};
pub use registry::{TypeCompiler, TypeRegistry, DEFAULT_TAG};
