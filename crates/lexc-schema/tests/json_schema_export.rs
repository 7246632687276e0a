//! Compiled Lexicons exported as JSON Schema agree with the native
//! validators under the `jsonschema` crate.

use lexc_core::LexiconDoc;
use lexc_schema::{compile_lexicon, CompileOptions};
use serde_json::{json, Value};

fn message_doc() -> LexiconDoc {
    LexiconDoc::from_value(json!({
        "lexicon": 1,
        "id": "com.example.chat.message",
        "defs": {
            "main": {
                "type": "record",
                "key": "tid",
                "record": {
                    "type": "object",
                    "required": ["text"],
                    "nullable": ["replyTo"],
                    "properties": {
                        "text": { "type": "string", "minLength": 1, "maxLength": 100 },
                        "priority": { "type": "integer", "enum": [1, 2, 3] },
                        "replyTo": { "type": "string" },
                        "mentions": {
                            "type": "array",
                            "maxLength": 2,
                            "items": { "type": "ref", "ref": "#mention" }
                        }
                    }
                }
            },
            "mention": {
                "type": "object",
                "required": ["did"],
                "properties": { "did": { "type": "string" } }
            }
        }
    }))
    .unwrap()
}

#[test]
fn record_facet_exports_equivalent_schema() {
    let compiled = compile_lexicon(&message_doc(), CompileOptions::default()).unwrap();
    let record = compiled.def("main").unwrap().facet("record").unwrap();
    let schema = record.to_json_schema();
    assert_eq!(schema["required"], json!(["text"]));

    let validator = jsonschema::validator_for(&schema).unwrap();
    let cases: Vec<(Value, bool)> = vec![
        (json!({ "text": "hi" }), true),
        (json!({ "text": "hi", "priority": 2, "replyTo": null }), true),
        (json!({ "text": "hi", "mentions": [{ "did": "did:plc:1" }] }), true),
        (json!({ "text": "" }), false),
        (json!({ "priority": 1 }), false),
        (json!({ "text": "hi", "priority": 4 }), false),
        (json!({ "text": "hi", "mentions": [{}] }), false),
        (json!({ "text": "hi", "mentions": [{ "did": "a" }, { "did": "b" }, { "did": "c" }] }), false),
    ];
    for (instance, expected) in cases {
        assert_eq!(record.accepts(&instance), expected, "native: {instance}");
        assert_eq!(validator.is_valid(&instance), expected, "jsonschema: {instance}");
    }
}
