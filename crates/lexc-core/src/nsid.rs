//! # Lexicon References
//!
//! A reference names a definition in some Lexicon document:
//!
//! - `com.example.post` — the `main` definition of `com.example.post`
//! - `com.example.post#view` — the `view` definition
//! - `lex:com.example.post#view` — same, with the URI scheme prefix
//! - `#view` — the `view` definition of the document being compiled
//!
//! Parsing is total: every string is a reference, resolution decides
//! whether it points anywhere.

use std::fmt;

/// Definition key used when a reference has no `#fragment`.
pub const MAIN_DEF: &str = "main";

/// URI scheme prefix accepted (and stripped) on references.
pub const LEX_URI_PREFIX: &str = "lex:";

/// A parsed `nsid#defKey` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexRef {
    nsid: String,
    def_key: String,
}

impl LexRef {
    /// Parse a reference string. The NSID is empty for local `#def` refs.
    pub fn parse(reference: &str) -> Self {
        let reference = reference.strip_prefix(LEX_URI_PREFIX).unwrap_or(reference);
        let (nsid, def_key) = match reference.split_once('#') {
            Some((nsid, def_key)) if !def_key.is_empty() => (nsid, def_key),
            Some((nsid, _)) => (nsid, MAIN_DEF),
            None => (reference, MAIN_DEF),
        };
        Self {
            nsid: nsid.to_string(),
            def_key: def_key.to_string(),
        }
    }

    /// Build a reference from its parts.
    pub fn new(nsid: impl Into<String>, def_key: impl Into<String>) -> Self {
        Self {
            nsid: nsid.into(),
            def_key: def_key.into(),
        }
    }

    /// Namespace identifier of the referenced document.
    pub fn nsid(&self) -> &str {
        &self.nsid
    }

    /// Key of the referenced definition within its document.
    pub fn def_key(&self) -> &str {
        &self.def_key
    }

    /// True for `#def` references that name no document.
    pub fn is_local(&self) -> bool {
        self.nsid.is_empty()
    }

    /// Fill in the NSID of a local reference. Non-local references are
    /// returned unchanged.
    pub fn with_base(self, base_nsid: &str) -> Self {
        if self.is_local() {
            Self {
                nsid: base_nsid.to_string(),
                def_key: self.def_key,
            }
        } else {
            self
        }
    }

    /// The `$type` value identifying objects of the referenced definition:
    /// the bare NSID for `main`, `nsid#def` otherwise.
    pub fn discriminator(&self) -> String {
        if self.def_key == MAIN_DEF {
            self.nsid.clone()
        } else {
            format!("{}#{}", self.nsid, self.def_key)
        }
    }
}

impl fmt::Display for LexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.nsid, self.def_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_nsid_defaults_to_main() {
        let r = LexRef::parse("com.example.user");
        assert_eq!(r.nsid(), "com.example.user");
        assert_eq!(r.def_key(), "main");
        assert!(!r.is_local());
    }

    #[test]
    fn fragment_and_prefix() {
        let r = LexRef::parse("lex:com.atproto.label.subscribeLabels#info");
        assert_eq!(r.nsid(), "com.atproto.label.subscribeLabels");
        assert_eq!(r.def_key(), "info");
    }

    #[test]
    fn empty_fragment_is_main() {
        assert_eq!(LexRef::parse("com.example.a#").def_key(), "main");
    }

    #[test]
    fn local_reference_takes_base() {
        let r = LexRef::parse("#view");
        assert!(r.is_local());
        let r = r.with_base("app.bsky.feed.defs");
        assert_eq!(r.to_string(), "app.bsky.feed.defs#view");
    }

    #[test]
    fn discriminator_omits_main() {
        assert_eq!(LexRef::parse("com.example.post").discriminator(), "com.example.post");
        assert_eq!(
            LexRef::parse("com.example.post#main").discriminator(),
            "com.example.post"
        );
        assert_eq!(
            LexRef::parse("com.example.post#view").discriminator(),
            "com.example.post#view"
        );
    }
}
