//! Leaf compilers: scalars, binary wrappers and tokens.

use lexc_core::{
    object_path, BlobDef, BooleanDef, BytesDef, CidLinkDef, IntegerDef, LexRef, NullDef,
    StringDef, TokenDef, UnknownDef,
};
use lexc_validator::Validator;
use serde_json::{json, Map, Value};

use crate::context::CompileContext;
use crate::error::CompileError;
use crate::options::ConstPolicy;

fn apply_const(validator: Validator, constant: Option<&Value>, ctx: &CompileContext) -> Validator {
    match (constant, ctx.const_policy()) {
        (None, _) => validator,
        (Some(value), ConstPolicy::Default) => validator.default_value(value.clone()),
        (Some(value), ConstPolicy::Enforce) => {
            Validator::literal(value.clone()).default_value(value.clone())
        }
    }
}

fn meta(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

pub fn compile_string(
    def: &StringDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let mut v = Validator::string();
    if let Some(min) = def.min_length {
        v = v.min_length(min);
    }
    if let Some(max) = def.max_length {
        v = v.max_length(max);
    }
    if let Some(allowed) = &def.enum_values {
        v = v.one_of_strings(allowed.iter().cloned());
    }
    let v = apply_const(v, def.const_value.as_ref(), ctx);

    if !def.known_values.is_empty() {
        ctx.record_metadata(path, meta("knownValues", json!(def.known_values)));
    }
    if let Some(format) = &def.format {
        ctx.record_metadata(path, meta("format", json!(format)));
    }
    Ok(v)
}

/// Integers accept numeric strings and are read as whole numbers.
pub fn compile_integer(
    def: &IntegerDef,
    _path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let mut v = Validator::integer().coerce();
    if let Some(min) = def.minimum {
        v = v.minimum(min as f64);
    }
    if let Some(max) = def.maximum {
        v = v.maximum(max as f64);
    }
    if let Some(allowed) = &def.enum_values {
        v = v.one_of_numbers(allowed.iter().map(|n| *n as f64));
    }
    Ok(apply_const(v, def.const_value.as_ref(), ctx))
}

pub fn compile_boolean(
    def: &BooleanDef,
    _path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    Ok(apply_const(Validator::boolean(), def.const_value.as_ref(), ctx))
}

pub fn compile_null(
    _def: &NullDef,
    _path: &str,
    _ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    Ok(Validator::null())
}

pub fn compile_unknown(
    _def: &UnknownDef,
    _path: &str,
    _ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    Ok(Validator::unknown())
}

/// `{ $type: "blob", mimeType, size, ref: { $link } }`. `$type` is filled
/// in when missing and flagged read-only in the metadata table.
pub fn compile_blob(
    def: &BlobDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    ctx.record_metadata(&object_path(path, "$type"), meta("readOnly", json!(true)));

    let mut mime_type = Validator::string();
    if !def.accept.is_empty() {
        mime_type = mime_type.accept_mime(def.accept.iter().cloned());
    }
    let mut size = Validator::integer().coerce();
    if let Some(max) = def.max_size {
        size = size.maximum(max as f64);
    }
    Ok(Validator::object([
        ("$type", Validator::string().default_value("blob")),
        ("mimeType", mime_type),
        ("size", size),
        (
            "ref",
            Validator::object([(
                "$link",
                Validator::string().describe("content identifier of the uploaded blob"),
            )]),
        ),
    ]))
}

/// `{ $bytes: <base64> }` with the length bounds on the encoded string.
pub fn compile_bytes(
    def: &BytesDef,
    _path: &str,
    _ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let mut encoded = Validator::string();
    if let Some(min) = def.min_length {
        encoded = encoded.min_length(min);
    }
    if let Some(max) = def.max_length {
        encoded = encoded.max_length(max);
    }
    Ok(Validator::object([("$bytes", encoded)]))
}

pub fn compile_cid_link(
    _def: &CidLinkDef,
    _path: &str,
    _ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    Ok(Validator::object([("$link", Validator::string())]))
}

/// A string defaulting to the token's own name (`nsid#def`). The name is
/// taken from the definition currently in scope, or from the last address
/// segment when compiled outside any document.
pub fn compile_token(
    _def: &TokenDef,
    path: &str,
    ctx: &mut CompileContext,
) -> Result<Validator, CompileError> {
    let name = match ctx.current() {
        Some(current) => current.discriminator(),
        None => {
            let key = path.rsplit('.').next().unwrap_or(path);
            LexRef::parse(&format!("#{key}")).discriminator()
        }
    };
    Ok(Validator::string().default_value(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use serde_json::json;

    fn ctx() -> CompileContext {
        CompileContext::new(CompileOptions::default())
    }

    #[test]
    fn string_bounds_and_const_default() {
        let def = StringDef {
            min_length: Some(2),
            max_length: Some(4),
            const_value: Some(json!("abc")),
            ..StringDef::default()
        };
        let v = compile_string(&def, "s", &mut ctx()).unwrap();
        assert!(v.accepts(&json!("ab")));
        assert!(!v.accepts(&json!("a")));
        assert!(!v.accepts(&json!("abcde")));
        assert_eq!(v.parse_field(None).unwrap(), Some(json!("abc")));
    }

    #[test]
    fn enforced_const_rejects_other_values() {
        let def = BooleanDef {
            const_value: Some(json!(true)),
            ..BooleanDef::default()
        };
        let mut ctx =
            CompileContext::new(CompileOptions::new().const_policy(ConstPolicy::Enforce));
        let v = compile_boolean(&def, "b", &mut ctx).unwrap();
        assert!(v.accepts(&json!(true)));
        assert!(!v.accepts(&json!(false)));
        assert_eq!(v.parse_field(None).unwrap(), Some(json!(true)));
    }

    #[test]
    fn string_enum_enforced_known_values_recorded() {
        let def = StringDef {
            enum_values: Some(vec!["a".into(), "b".into()]),
            known_values: vec!["x".into()],
            format: Some("datetime".into()),
            ..StringDef::default()
        };
        let mut ctx = ctx();
        let v = compile_string(&def, "s", &mut ctx).unwrap();
        assert!(v.accepts(&json!("a")));
        assert!(!v.accepts(&json!("x")));
        assert_eq!(ctx.metadata()["s"]["knownValues"], json!(["x"]));
        assert_eq!(ctx.metadata()["s"]["format"], "datetime");
    }

    #[test]
    fn integer_bounds_coerce_and_enum() {
        let def = IntegerDef {
            minimum: Some(1),
            maximum: Some(10),
            ..IntegerDef::default()
        };
        let v = compile_integer(&def, "n", &mut ctx()).unwrap();
        assert_eq!(v.parse(&json!("5")).unwrap(), json!(5));
        assert!(!v.accepts(&json!(0)));
        assert!(!v.accepts(&json!(11)));
        assert!(!v.accepts(&json!(2.5)));

        let def = IntegerDef {
            enum_values: Some(vec![2, 4]),
            ..IntegerDef::default()
        };
        let v = compile_integer(&def, "n", &mut ctx()).unwrap();
        assert!(v.accepts(&json!(4)));
        assert!(!v.accepts(&json!(3)));
    }

    #[test]
    fn blob_shape_and_type_metadata() {
        let def = BlobDef {
            accept: vec!["image/*".into()],
            max_size: Some(1000),
            ..BlobDef::default()
        };
        let mut ctx = ctx();
        let v = compile_blob(&def, "avatar", &mut ctx).unwrap();
        let parsed = v
            .parse(&json!({
                "mimeType": "image/png",
                "size": "123",
                "ref": { "$link": "bafyrei" }
            }))
            .unwrap();
        assert_eq!(parsed["$type"], "blob");
        assert_eq!(parsed["size"], 123);
        assert!(!v.accepts(&json!({
            "mimeType": "text/plain", "size": 1, "ref": { "$link": "x" }
        })));
        assert!(!v.accepts(&json!({
            "mimeType": "image/png", "size": 5000, "ref": { "$link": "x" }
        })));
        assert_eq!(ctx.metadata()["avatar.$type"]["readOnly"], true);
    }

    #[test]
    fn bytes_and_cid_link_wrappers() {
        let def = BytesDef {
            min_length: Some(1),
            max_length: Some(8),
            ..BytesDef::default()
        };
        let v = compile_bytes(&def, "b", &mut ctx()).unwrap();
        assert!(v.accepts(&json!({ "$bytes": "AAEC" })));
        assert!(!v.accepts(&json!({ "$bytes": "" })));
        assert!(!v.accepts(&json!("AAEC")));

        let v = compile_cid_link(&CidLinkDef::default(), "c", &mut ctx()).unwrap();
        assert!(v.accepts(&json!({ "$link": "bafy" })));
        assert!(!v.accepts(&json!({ "$link": 1 })));
    }

    #[test]
    fn token_defaults_to_its_name() {
        let mut ctx = ctx();
        ctx.enter_scope(LexRef::new("com.example.labels", "spam"));
        let v = compile_token(&TokenDef::default(), "spam", &mut ctx).unwrap();
        assert_eq!(
            v.parse_field(None).unwrap(),
            Some(json!("com.example.labels#spam"))
        );
    }
}
