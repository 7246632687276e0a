//! # lexc-core — Foundational Types for the Lexicon Compiler
//!
//! This crate is the leaf of the workspace DAG. It defines the data the
//! compiler reads and the addresses it writes:
//!
//! 1. **The Lexicon document model.** [`LexiconDoc`] holds an ordered map of
//!    named [`LexDef`] definitions. `LexDef` is a sum type keyed on the JSON
//!    `type` tag; tags this crate does not know are preserved as
//!    [`LexDef::Other`] so that the compiler's type registry, not the
//!    deserializer, decides whether they are supported.
//!
//! 2. **Reference parsing.** [`LexRef`] splits `lex:com.example.post#view`
//!    into its NSID and definition key (`main` when omitted).
//!
//! 3. **Path algebra.** [`object_path`], [`array_path`] and [`union_path`]
//!    build the dot-notated addresses that key the compiler's override
//!    table. They are pure and total.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lexc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Declaration order of properties and definitions is preserved end to end.

pub mod error;
pub mod lexicon;
pub mod nsid;
pub mod path;

pub use error::LexiconError;
pub use lexicon::{
    ArrayDef, BlobDef, BodyDef, BooleanDef, BytesDef, CidLinkDef, ErrorDef, IntegerDef,
    LexDef, LexiconDoc, MessageDef, NullDef, ObjectDef, OpaqueDef, OrderedMap, ProcedureDef,
    QueryDef, RecordDef, RefDef, StringDef, SubscriptionDef, TokenDef, UnionDef, UnknownDef,
};
pub use nsid::{LexRef, MAIN_DEF};
pub use path::{array_path, object_path, parse_path, render_path, union_path, PathSegment};
