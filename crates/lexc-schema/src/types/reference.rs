//! Reference resolution.
//!
//! A `ref` is transparent to addressing: the target definition is compiled
//! at the address of the ref itself, so an override written for
//! `post.embed.uri` applies whether `embed` is declared inline or
//! referenced from another document. The target keeps its own
//! description and default; the node compiler extends the result at the
//! ref's address exactly once, like any other node.

use lexc_core::{LexDef, RefDef};
use lexc_validator::Validator;
use tracing::trace;

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::extend::annotate;
use crate::types::dispatch;

pub fn compile_ref(
    def: &RefDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    if !ctx.follow_refs() {
        trace!(path, reference = def.reference.as_str(), "not following reference");
        return Ok(Validator::any());
    }

    let target = ctx.qualify(&def.reference);
    let lexicons = ctx.lexicons();
    let doc = lexicons.get(target.nsid()).ok_or_else(|| {
        CompileError::UnresolvableReferenceDocument {
            reference: def.reference.clone(),
            nsid: target.nsid().to_string(),
        }
    })?;
    let target_def = doc.def(target.def_key()).ok_or_else(|| {
        CompileError::UnresolvableReferenceDefinition {
            reference: def.reference.clone(),
            nsid: target.nsid().to_string(),
            def_key: target.def_key().to_string(),
        }
    })?;

    if !ctx.enter_ref(&target)? {
        trace!(path, target = %target, "cyclic reference compiled permissively");
        return Ok(Validator::any());
    }
    trace!(path, target = %target, "following reference");
    let (compiled, description, default) = match target_def {
        LexDef::Record(record) => match &record.record {
            Some(object) => {
                let compile_object = ctx.registry().resolve("object", true);
                let compiled = compile_object
                    .and_then(|compile| compile(&LexDef::Object(object.clone()), path, ctx));
                let description = object.description.as_deref().or(record.description.as_deref());
                (compiled, description, None)
            }
            None => (Ok(Validator::never()), None, None),
        },
        other => (
            dispatch(other, path, ctx),
            other.description(),
            other.default_value(),
        ),
    };
    ctx.exit_ref();

    Ok(annotate(compiled?, description, default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompileOptions, CyclePolicy, PathOptions};
    use crate::types::compile_node;
    use lexc_core::{LexiconDoc, ObjectDef, RecordDef, StringDef};
    use serde_json::{json, Map};

    fn target_doc() -> LexiconDoc {
        let mut doc = LexiconDoc::with_defs([
            (
                "main",
                LexDef::String(StringDef {
                    max_length: Some(3),
                    ..StringDef::default()
                }),
            ),
            (
                "view",
                LexDef::Object(ObjectDef {
                    required: vec!["uri".into()],
                    properties: [("uri", LexDef::String(StringDef::default()))]
                        .into_iter()
                        .collect(),
                    ..ObjectDef::default()
                }),
            ),
        ]);
        doc.id = Some("com.example.target".to_string());
        doc
    }

    #[test]
    fn resolves_main_and_named_defs() {
        let mut ctx = CompileContext::new(CompileOptions::new().with_lexicon(target_doc()));
        let main = compile_ref(&RefDef::to("com.example.target"), "a", &mut ctx).unwrap();
        assert!(main.accepts(&json!("abc")));
        assert!(!main.accepts(&json!("abcd")));

        let view = compile_ref(&RefDef::to("lex:com.example.target#view"), "b", &mut ctx).unwrap();
        assert!(view.accepts(&json!({ "uri": "x" })));
        assert!(!view.accepts(&json!({})));
        assert_eq!(ctx.path_options().is_required("b.uri"), Some(true));
    }

    #[test]
    fn reference_is_transparent_to_addressing() {
        let options = CompileOptions::new()
            .with_lexicon(target_doc())
            .with_path_options("embed.uri", PathOptions::replace(Validator::literal("fixed")));
        let mut ctx = CompileContext::new(options);
        let v = compile_ref(&RefDef::to("com.example.target#view"), "embed", &mut ctx).unwrap();
        assert!(v.accepts(&json!({ "uri": "fixed" })));
        assert!(!v.accepts(&json!({ "uri": "other" })));
    }

    #[test]
    fn missing_document_and_definition() {
        let mut ctx = CompileContext::new(CompileOptions::new().with_lexicon(target_doc()));
        let err = compile_ref(&RefDef::to("com.example.missing"), "a", &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvableReferenceDocument { ref nsid, .. } if nsid == "com.example.missing"
        ));
        let err = compile_ref(&RefDef::to("com.example.target#nope"), "a", &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvableReferenceDefinition { ref def_key, .. } if def_key == "nope"
        ));
    }

    #[test]
    fn unfollowed_refs_skip_the_dictionary() {
        let mut ctx = CompileContext::new(CompileOptions::new().follow_refs(false));
        let v = compile_ref(&RefDef::to("com.example.missing"), "a", &mut ctx).unwrap();
        assert!(v.accepts(&json!(42)));
    }

    #[test]
    fn record_targets_compile_to_their_object() {
        let mut doc = LexiconDoc::with_defs([(
            "main",
            LexDef::Record(RecordDef {
                key: Some("tid".into()),
                record: Some(ObjectDef {
                    required: vec!["text".into()],
                    properties: [("text", LexDef::String(StringDef::default()))]
                        .into_iter()
                        .collect(),
                    ..ObjectDef::default()
                }),
                ..RecordDef::default()
            }),
        )]);
        doc.id = Some("com.example.post".into());
        let mut ctx = CompileContext::new(CompileOptions::new().with_lexicon(doc));
        let v = compile_ref(&RefDef::to("com.example.post"), "p", &mut ctx).unwrap();
        assert!(v.accepts(&json!({ "text": "hi" })));
        assert!(!v.accepts(&json!({})));
    }

    fn self_referencing() -> LexiconDoc {
        let mut doc = LexiconDoc::with_defs([(
            "node",
            LexDef::Object(ObjectDef {
                properties: [("next", LexDef::Ref(RefDef::to("#node")))]
                    .into_iter()
                    .collect(),
                ..ObjectDef::default()
            }),
        )]);
        doc.id = Some("com.example.list".into());
        doc
    }

    #[test]
    fn cycles_fail_fast_by_default() {
        let mut ctx = CompileContext::new(CompileOptions::new().with_lexicon(self_referencing()));
        let err = compile_ref(&RefDef::to("com.example.list#node"), "n", &mut ctx).unwrap_err();
        assert!(matches!(err, CompileError::ReferenceCycle { .. }));
    }

    #[test]
    fn permissive_cycles_stop_at_the_back_edge() {
        let options = CompileOptions::new()
            .with_lexicon(self_referencing())
            .cycle_policy(CyclePolicy::Permissive);
        let mut ctx = CompileContext::new(options);
        let v = compile_ref(&RefDef::to("com.example.list#node"), "n", &mut ctx).unwrap();
        assert!(v.accepts(&json!({ "next": { "anything": true } })));
        assert!(!v.accepts(&json!("not an object")));
    }

    fn described_ref(reference: &str) -> LexDef {
        LexDef::Ref(RefDef {
            description: Some("link to the target".into()),
            ..RefDef::to(reference)
        })
    }

    #[test]
    fn followed_ref_is_extended_once_at_its_address() {
        let mut target = target_doc();
        target.defs.insert(
            "described",
            LexDef::String(StringDef {
                description: Some("target text".into()),
                default: Some(json!("d")),
                ..StringDef::default()
            }),
        );
        let mut ctx = CompileContext::new(CompileOptions::new().with_lexicon(target));

        let v = compile_node(&described_ref("com.example.target#described"), "a", &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(v.description(), Some("target text"));
        assert_eq!(v.parse_field(None).unwrap(), Some(json!("d")));

        let v = compile_node(&described_ref("com.example.target"), "b", &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(v.description(), Some("link to the target"));
        assert!(v.is_optional());
    }

    #[test]
    fn unfollowed_ref_keeps_description_and_metadata() {
        let mut meta = Map::new();
        meta.insert("label".into(), json!("Author"));
        let options = CompileOptions::new()
            .follow_refs(false)
            .with_path_options("main.author", PathOptions::new().with_metadata(meta));
        let mut ctx = CompileContext::new(options);
        let v = compile_node(&described_ref("com.example.actor"), "main.author", &mut ctx)
            .unwrap()
            .unwrap();
        assert!(v.accepts(&json!(42)));
        assert!(v.is_optional());
        assert_eq!(v.description(), Some("link to the target"));
        assert_eq!(ctx.metadata()["main.author"]["label"], "Author");
    }

    #[test]
    fn permissive_back_edge_is_extended() {
        let options = CompileOptions::new()
            .with_lexicon(self_referencing())
            .cycle_policy(CyclePolicy::Permissive);
        let mut ctx = CompileContext::new(options);
        let v = compile_ref(&RefDef::to("com.example.list#node"), "n", &mut ctx).unwrap();
        let back_edge = v.field("next").unwrap();
        assert!(back_edge.is_optional());
        assert!(v.accepts(&json!({})));
    }
}
