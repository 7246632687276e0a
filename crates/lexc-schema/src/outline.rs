//! # Address Outline
//!
//! Lists every address the compiler would visit for a document, in the
//! order it would visit them. Used to write override tables without
//! reading the Lexicon by hand. References are followed transparently,
//! as during compilation; unresolvable and cyclic references end the walk
//! at that address instead of failing.

use lexc_core::{array_path, object_path, union_path, LexDef, LexRef, LexiconDoc, ObjectDef};
use serde::Serialize;

use crate::options::LexiconDict;

/// One addressable node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub path: String,
    /// `type` tag of the node at this address.
    pub type_tag: String,
    /// The reference string for `ref` nodes and union branches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

struct Walker<'a> {
    lexicons: &'a LexiconDict,
    scope: Vec<LexRef>,
    entries: Vec<PathEntry>,
}

/// Outline `doc`, resolving references against `lexicons` (and against
/// `doc` itself for local references).
pub fn outline(doc: &LexiconDoc, lexicons: &LexiconDict) -> Vec<PathEntry> {
    let mut own = LexiconDict::new();
    let lexicons = match &doc.id {
        Some(id) if !lexicons.contains_key(id) => {
            own.clone_from(lexicons);
            own.insert(id.clone(), doc.clone());
            &own
        }
        _ => lexicons,
    };
    let mut walker = Walker {
        lexicons,
        scope: Vec::new(),
        entries: Vec::new(),
    };
    let nsid = doc.id.clone().unwrap_or_default();
    for (key, def) in doc.defs.iter() {
        walker.scope.push(LexRef::new(nsid.as_str(), key));
        walker.definition(def, key);
        walker.scope.pop();
    }
    walker.entries
}

impl Walker<'_> {
    fn push(&mut self, path: &str, type_tag: &str, reference: Option<&str>) {
        self.entries.push(PathEntry {
            path: path.to_string(),
            type_tag: type_tag.to_string(),
            reference: reference.map(str::to_string),
        });
    }

    fn definition(&mut self, def: &LexDef, path: &str) {
        self.push(path, def.type_tag(), None);
        match def {
            LexDef::Record(d) => self.facet_object(d.record.as_ref(), &object_path(path, "record")),
            LexDef::Query(d) => {
                self.facet_object(d.parameters.as_ref(), &object_path(path, "parameters"));
                self.facet_body(d.output.as_ref().and_then(|b| b.schema.as_deref()), path, "output");
            }
            LexDef::Procedure(d) => {
                self.facet_object(d.parameters.as_ref(), &object_path(path, "parameters"));
                self.facet_body(d.input.as_ref().and_then(|b| b.schema.as_deref()), path, "input");
                self.facet_body(d.output.as_ref().and_then(|b| b.schema.as_deref()), path, "output");
            }
            LexDef::Subscription(d) => {
                self.facet_object(d.parameters.as_ref(), &object_path(path, "parameters"));
                self.facet_body(d.message.as_ref().and_then(|m| m.schema.as_deref()), path, "message");
            }
            other => self.children(other, path),
        }
    }

    fn facet_object(&mut self, def: Option<&ObjectDef>, path: &str) {
        if let Some(def) = def {
            self.push(path, "object", None);
            self.properties(def, path);
        }
    }

    fn facet_body(&mut self, schema: Option<&LexDef>, path: &str, facet: &str) {
        if let Some(schema) = schema {
            self.node(schema, &object_path(&object_path(path, facet), "schema"));
        }
    }

    fn node(&mut self, def: &LexDef, path: &str) {
        match def {
            LexDef::Ref(r) => self.push(path, "ref", Some(&r.reference)),
            other => self.push(path, other.type_tag(), None),
        }
        self.children(def, path);
    }

    fn properties(&mut self, def: &ObjectDef, path: &str) {
        for (key, property) in def.properties.iter() {
            self.node(property, &object_path(path, key));
        }
    }

    fn children(&mut self, def: &LexDef, path: &str) {
        match def {
            LexDef::Object(d) | LexDef::Params(d) => self.properties(d, path),
            LexDef::Array(d) => self.node(&d.items, &array_path(path)),
            LexDef::Union(d) => {
                for (index, reference) in d.refs.iter().enumerate() {
                    let branch_path = union_path(path, index);
                    self.push(&branch_path, "ref", Some(reference));
                    self.follow(reference, &branch_path);
                }
            }
            LexDef::Ref(r) => self.follow(&r.reference, path),
            _ => {}
        }
    }

    fn follow(&mut self, reference: &str, path: &str) {
        let base = self.scope.last().map(LexRef::nsid).unwrap_or_default();
        let target = LexRef::parse(reference).with_base(base);
        if self.scope.contains(&target) {
            return;
        }
        let lexicons = self.lexicons;
        let Some(def) = lexicons.get(target.nsid()).and_then(|doc| doc.def(target.def_key())) else {
            return;
        };
        self.scope.push(target);
        match def {
            LexDef::Record(d) => {
                if let Some(record) = &d.record {
                    self.properties(record, path);
                }
            }
            other => self.children(other, path),
        }
        self.scope.pop();
    }
}
