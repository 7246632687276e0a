//! # Compile Errors
//!
//! Every variant aborts the compile call that raised it: a Lexicon that
//! names a missing document, a missing definition or an unsupported type
//! is malformed or incomplete, and no partial validator tree is returned.

use lexc_core::LexiconError;
use thiserror::Error;

/// Error raised while compiling a Lexicon.
#[derive(Error, Debug)]
pub enum CompileError {
    /// No type compiler is registered for a tag and the lookup was strict
    /// (or no `$default` entry exists).
    #[error("unsupported parser type: {type_tag}")]
    UnsupportedType {
        /// The unmatched `type` tag.
        type_tag: String,
    },

    /// A reference names a document absent from the lexicon dictionary.
    #[error("cannot infer reference lexicon '{nsid}' for ref '{reference}'")]
    UnresolvableReferenceDocument {
        /// The reference as written.
        reference: String,
        /// NSID that was looked up.
        nsid: String,
    },

    /// The referenced document exists but lacks the named definition.
    #[error("cannot infer reference definition '{def_key}' in lexicon '{nsid}' for ref '{reference}'")]
    UnresolvableReferenceDefinition {
        /// The reference as written.
        reference: String,
        /// NSID of the document that was found.
        nsid: String,
        /// Definition key that was missing.
        def_key: String,
    },

    /// Reference resolution revisited a definition already being compiled.
    #[error("reference cycle: {chain}")]
    ReferenceCycle {
        /// The resolution chain, outermost first, ending at the repeat.
        chain: String,
    },

    /// A definition's fields did not fit the compiler it was dispatched to.
    #[error("malformed definition at '{path}': {source}")]
    MalformedDefinition {
        /// Address of the definition.
        path: String,
        /// What was wrong with it.
        source: LexiconError,
    },

    /// A Lexicon document could not be read.
    #[error("lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    /// A Lexicon file could not be loaded into a catalog.
    #[error("lexicon load error for '{path}': {reason}")]
    CatalogLoad {
        /// File or directory that failed.
        path: String,
        /// Why it failed.
        reason: String,
    },

    /// IO error reading Lexicon files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
