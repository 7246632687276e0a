//! # lexc-validator — Runtime Validators
//!
//! The value type the Lexicon compiler produces. A [`Validator`] is an
//! immutable tree that can:
//!
//! - **parse** a JSON value, coercing where the node allows it (numeric
//!   strings into numbers), stripping undeclared object keys, and filling
//!   declared defaults for missing fields;
//! - **describe** itself: description, default, optional/nullable flags,
//!   and a JSON Schema rendering via [`Validator::to_json_schema`];
//! - **compose** with other validators: arrays, objects, unions and
//!   `$type`-discriminated unions.
//!
//! Parse failures are reported as a [`ValidationError`] carrying every
//! [`Violation`] found, each with the JSON Pointer of the offending value.
//!
//! ## Crate Policy
//!
//! - Validators never mutate after construction; builders consume `self`.
//! - A missing value is distinct from `null`: missing is handled by the
//!   optional/default wrappers, `null` only by `nullable` or a null node.

pub mod error;
pub mod json_schema;
mod parse;
pub mod validator;

pub use error::{ValidationError, ValidationViolations, Violation};
pub use validator::{Kind, NumberRules, StringRules, TaggedUnion, Validator};
