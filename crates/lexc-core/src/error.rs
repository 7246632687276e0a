//! # Error Types
//!
//! Errors raised while reading Lexicon documents into the typed model.
//! A Lexicon with an unknown `type` tag is *not* an error here; only
//! structurally malformed definitions are.

use thiserror::Error;

/// Error reading a Lexicon document or definition.
#[derive(Error, Debug)]
pub enum LexiconError {
    /// A definition was not a JSON object.
    #[error("definition must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead.
        found: &'static str,
    },

    /// A definition's fields did not match its declared type.
    #[error("invalid '{type_tag}' definition: {reason}")]
    InvalidDefinition {
        /// The definition's `type` tag.
        type_tag: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The document as a whole could not be parsed.
    #[error("invalid lexicon document: {0}")]
    Document(#[from] serde_json::Error),
}
