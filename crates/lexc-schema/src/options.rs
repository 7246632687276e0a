//! # Compile Options
//!
//! Everything a caller can steer a compilation with. All fields are
//! optional; `CompileOptions::default()` follows references, uses only the
//! built-in type compilers and has an empty override table.
//!
//! The override table ([`PathOptionTable`]) is keyed by the dotted
//! addresses produced by [`lexc_core::path`]. The compiler writes back into
//! it (required flags inferred from `required` lists), and the final table
//! is returned with the compiled lexicon.

use std::collections::BTreeMap;

use lexc_core::LexiconDoc;
use lexc_validator::Validator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::TypeRegistry;

/// Lexicon documents available to the reference resolver, keyed by NSID.
pub type LexiconDict = BTreeMap<String, LexiconDoc>;

/// Caller metadata recorded per address during compilation.
pub type MetadataTable = BTreeMap<String, Map<String, Value>>;

// ---------------------------------------------------------------------------
// Path options
// ---------------------------------------------------------------------------

/// What to put at an address instead of compiling the definition there.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// Drop the node: object properties and union branches disappear,
    /// top-level definitions are skipped.
    Omit,
    /// Use this validator verbatim; the subtree is not compiled.
    Replace(Validator),
}

/// Per-address caller options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathOptions {
    pub override_with: Option<Override>,
    /// `Some(true)` keeps the node mandatory; anything else makes it
    /// optional. The compiler sets this for keys in an object's
    /// `required` list unless the caller set `Some(false)`.
    pub is_required: Option<bool>,
    /// Attached to the address in the compiled lexicon's metadata table.
    pub metadata: Option<Map<String, Value>>,
    /// Extra fields appended to the object compiled at this address.
    pub additional_props: Vec<(String, Validator)>,
}

impl PathOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn omit() -> Self {
        Self {
            override_with: Some(Override::Omit),
            ..Self::default()
        }
    }

    pub fn replace(validator: Validator) -> Self {
        Self {
            override_with: Some(Override::Replace(validator)),
            ..Self::default()
        }
    }

    pub fn required(mut self, is_required: bool) -> Self {
        self.is_required = Some(is_required);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_additional_prop(mut self, key: impl Into<String>, field: Validator) -> Self {
        self.additional_props.push((key.into(), field));
        self
    }
}

/// Address-keyed override table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathOptionTable {
    entries: BTreeMap<String, PathOptions>,
}

impl PathOptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the options for `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl Into<String>, options: PathOptions) {
        self.entries.insert(path.into(), options);
    }

    pub fn get(&self, path: &str) -> Option<&PathOptions> {
        self.entries.get(path)
    }

    /// Options for `path`, created empty if absent.
    pub fn entry(&mut self, path: &str) -> &mut PathOptions {
        self.entries.entry(path.to_string()).or_default()
    }

    pub fn override_at(&self, path: &str) -> Option<&Override> {
        self.get(path).and_then(|o| o.override_with.as_ref())
    }

    pub fn is_required(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|o| o.is_required)
    }

    /// Record that `path` is mandatory unless the caller explicitly made
    /// it optional.
    pub fn mark_required(&mut self, path: &str) {
        let entry = self.entry(path);
        if entry.is_required != Some(false) {
            entry.is_required = Some(true);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathOptions)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, PathOptions)> for PathOptionTable {
    fn from_iter<I: IntoIterator<Item = (K, PathOptions)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What to do when reference resolution loops back on itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Abort with `CompileError::ReferenceCycle`.
    #[default]
    Fail,
    /// Compile the repeated reference to accept-anything.
    Permissive,
}

/// How a definition's `const` is compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstPolicy {
    /// The constant becomes the default value; other values still pass.
    #[default]
    Default,
    /// Only the constant is accepted; it is also the default.
    Enforce,
}

// ---------------------------------------------------------------------------
// CompileOptions
// ---------------------------------------------------------------------------

/// Options for one compile call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Resolve `ref`s and union branches. When false they accept anything
    /// and the dictionary is never consulted.
    pub follow_refs: bool,
    /// Entries merged over the built-in registry; caller entries win.
    pub registry_overrides: TypeRegistry,
    pub lexicons: LexiconDict,
    pub path_options: PathOptionTable,
    pub cycle_policy: CyclePolicy,
    pub const_policy: ConstPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            follow_refs: true,
            registry_overrides: TypeRegistry::new(),
            lexicons: LexiconDict::new(),
            path_options: PathOptionTable::new(),
            cycle_policy: CyclePolicy::default(),
            const_policy: ConstPolicy::default(),
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn follow_refs(mut self, follow: bool) -> Self {
        self.follow_refs = follow;
        self
    }

    /// Make `doc` resolvable by its `id`. Documents without an id cannot
    /// be referenced and are ignored.
    pub fn with_lexicon(mut self, doc: LexiconDoc) -> Self {
        match doc.id.clone() {
            Some(id) => {
                self.lexicons.insert(id, doc);
            }
            None => tracing::warn!("ignoring lexicon without an id"),
        }
        self
    }

    pub fn with_lexicons(self, docs: impl IntoIterator<Item = LexiconDoc>) -> Self {
        docs.into_iter().fold(self, Self::with_lexicon)
    }

    pub fn with_path_options(mut self, path: impl Into<String>, options: PathOptions) -> Self {
        self.path_options.insert(path, options);
        self
    }

    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry_overrides = registry;
        self
    }

    pub fn cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn const_policy(mut self, policy: ConstPolicy) -> Self {
        self.const_policy = policy;
        self
    }
}
