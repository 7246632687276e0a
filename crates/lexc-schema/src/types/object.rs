//! Object compiler (`object` and `params`).

use lexc_core::{object_path, ObjectDef};
use lexc_validator::Validator;
use tracing::trace;

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::types::compile_node;

/// Compile each property at `<path>.<key>` in declaration order.
///
/// Keys listed in `required` are marked required in the override table
/// before the property is compiled, unless the caller set `is_required:
/// false` or overrode the property. Omitted properties are left out of
/// the shape; `additional_props` registered for `path` are appended last.
pub fn compile_object(
    def: &ObjectDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let mut shape: Vec<(String, Validator)> = Vec::with_capacity(def.properties.len());
    for (key, property) in def.properties.iter() {
        let property_path = object_path(path, key);
        if !ctx.has_override(&property_path) && def.required.iter().any(|r| r == key) {
            ctx.path_options_mut().mark_required(&property_path);
        }
        let Some(mut field) = compile_node(property, &property_path, ctx)? else {
            continue;
        };
        if def.nullable.iter().any(|n| n == key) {
            field = field.nullable();
        }
        shape.push((key.to_string(), field));
    }

    let additional = ctx
        .path_options()
        .get(path)
        .map(|o| o.additional_props.clone())
        .unwrap_or_default();
    for (key, _) in &additional {
        trace!(path, key = key.as_str(), "splicing additional property");
    }
    shape.extend(additional);

    Ok(Validator::object(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CompileOptions, PathOptions};
    use lexc_core::{IntegerDef, LexDef, StringDef};
    use serde_json::json;

    fn person() -> ObjectDef {
        ObjectDef {
            description: Some("a person".into()),
            required: vec!["name".into()],
            nullable: vec!["nickname".into()],
            properties: [
                ("name", LexDef::String(StringDef::default())),
                ("age", LexDef::Integer(IntegerDef::default())),
                ("nickname", LexDef::String(StringDef::default())),
            ]
            .into_iter()
            .collect(),
        }
    }

    #[test]
    fn required_and_optional_properties() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        let v = compile_object(&person(), "", &mut ctx).unwrap();
        assert!(v.accepts(&json!({ "name": "John" })));
        assert!(v.accepts(&json!({ "name": "John", "age": 30 })));
        let err = v.parse(&json!({ "age": 30 })).unwrap_err();
        assert!(err.has_violation_at("/name"));
        assert_eq!(ctx.path_options().is_required("name"), Some(true));
        assert_eq!(ctx.path_options().is_required("age"), None);
        assert_eq!(v.field_keys(), vec!["name", "age", "nickname"]);
    }

    #[test]
    fn explicit_optional_beats_required_list() {
        let options = CompileOptions::new().with_path_options("p.name", PathOptions::new().required(false));
        let mut ctx = CompileContext::new(options);
        let v = compile_object(&person(), "p", &mut ctx).unwrap();
        assert!(v.accepts(&json!({})));
        assert_eq!(ctx.path_options().is_required("p.name"), Some(false));
    }

    #[test]
    fn omitted_property_is_not_in_shape() {
        let options = CompileOptions::new().with_path_options("age", PathOptions::omit());
        let mut ctx = CompileContext::new(options);
        let v = compile_object(&person(), "", &mut ctx).unwrap();
        assert!(v.field("age").is_none());
        let parsed = v.parse(&json!({ "name": "John", "age": "not a number" })).unwrap();
        assert_eq!(parsed, json!({ "name": "John" }));
    }

    #[test]
    fn replaced_property_is_not_marked_required() {
        let options = CompileOptions::new()
            .with_path_options("name", PathOptions::replace(Validator::literal("fixed")));
        let mut ctx = CompileContext::new(options);
        let v = compile_object(&person(), "", &mut ctx).unwrap();
        assert!(v.accepts(&json!({ "name": "fixed" })));
        assert!(!v.accepts(&json!({ "name": "John" })));
        assert_eq!(ctx.path_options().is_required("name"), None);
    }

    #[test]
    fn nullable_and_additional_props() {
        let options = CompileOptions::new().with_path_options(
            "",
            PathOptions::new().with_additional_prop("extra", Validator::boolean()),
        );
        let mut ctx = CompileContext::new(options);
        let v = compile_object(&person(), "", &mut ctx).unwrap();
        assert!(v.accepts(&json!({ "name": "J", "nickname": null, "extra": true })));
        assert!(!v.accepts(&json!({ "name": "J", "extra": "yes" })));
        assert_eq!(v.field_keys().last(), Some(&"extra"));
    }

    #[test]
    fn description_is_attached_by_the_node_compiler() {
        let mut ctx = CompileContext::new(CompileOptions::default());
        let raw = compile_object(&person(), "", &mut ctx).unwrap();
        assert_eq!(raw.description(), None);
        let node = compile_node(&LexDef::Object(person()), "", &mut ctx).unwrap().unwrap();
        assert_eq!(node.description(), Some("a person"));
        assert!(node.is_optional());
    }
}
