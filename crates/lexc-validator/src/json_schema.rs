//! # JSON Schema Export
//!
//! Renders a validator as a JSON Schema (Draft 2020-12) document so that
//! compiled Lexicons can be handed to tooling that speaks JSON Schema.
//!
//! The rendering describes the *parse output*, not the accepted input:
//! coercions (numeric strings into numbers) and defaults have no JSON
//! Schema equivalent and are reported only through `default`. Tagged
//! unions render as `anyOf`, which is the structural-fallback reading of
//! an open union.

use serde_json::{json, Map, Value};

use crate::validator::{Kind, Validator};

/// `$schema` URI written at the root of exported documents.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

impl Validator {
    /// Render as a standalone JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        let mut root = match self.schema_body() {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("allOf".to_string(), Value::Array(vec![other]));
                map
            }
        };
        root.insert("$schema".to_string(), Value::String(DRAFT_2020_12.to_string()));
        Value::Object(root)
    }

    fn schema_body(&self) -> Value {
        let mut schema = match &self.kind {
            Kind::Any | Kind::Unknown => Map::new(),
            Kind::Never => object(json!({ "not": {} })),
            Kind::Null => object(json!({ "type": "null" })),
            Kind::Boolean => object(json!({ "type": "boolean" })),
            Kind::String(rules) => {
                let mut s = object(json!({ "type": "string" }));
                if let Some(min) = rules.min_length {
                    s.insert("minLength".into(), min.into());
                }
                if let Some(max) = rules.max_length {
                    s.insert("maxLength".into(), max.into());
                }
                if let Some(allowed) = &rules.one_of {
                    s.insert("enum".into(), json!(allowed));
                }
                s
            }
            Kind::Number(rules) => {
                let mut s = object(json!({
                    "type": if rules.integer { "integer" } else { "number" }
                }));
                if let Some(min) = rules.minimum {
                    s.insert("minimum".into(), json!(min));
                }
                if let Some(max) = rules.maximum {
                    s.insert("maximum".into(), json!(max));
                }
                if let Some(allowed) = &rules.one_of {
                    s.insert("enum".into(), json!(allowed));
                }
                s
            }
            Kind::Literal(value) => object(json!({ "const": value })),
            Kind::Array {
                items,
                min_items,
                max_items,
            } => {
                let mut s = object(json!({ "type": "array", "items": items.schema_body() }));
                if let Some(min) = min_items {
                    s.insert("minItems".into(), (*min).into());
                }
                if let Some(max) = max_items {
                    s.insert("maxItems".into(), (*max).into());
                }
                s
            }
            Kind::Object { shape } => {
                let properties: Map<String, Value> = shape
                    .iter()
                    .map(|(key, field)| (key.clone(), field.schema_body()))
                    .collect();
                let required: Vec<&str> = shape
                    .iter()
                    .filter(|(_, field)| !field.accepts_missing())
                    .map(|(key, _)| key.as_str())
                    .collect();
                let mut s = object(json!({ "type": "object", "properties": properties }));
                if !required.is_empty() {
                    s.insert("required".into(), json!(required));
                }
                s
            }
            Kind::Union(branches) => object(json!({
                "anyOf": branches.iter().map(Validator::schema_body).collect::<Vec<_>>()
            })),
            Kind::Tagged(tagged) => object(json!({
                "anyOf": tagged.branches.iter().map(|(_, b)| b.schema_body()).collect::<Vec<_>>()
            })),
        };

        if self.nullable {
            let inner = Value::Object(std::mem::take(&mut schema));
            schema.insert("anyOf".into(), json!([inner, { "type": "null" }]));
        }
        if let Some(description) = &self.description {
            schema.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        Value::Object(schema)
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
