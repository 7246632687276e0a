//! # CLI Subcommands
//!
//! Drives the subcommand handlers against lexicons, configs and instances
//! written to a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use lexc_cli::compile::{json_schema_export, run_compile, CompileArgs};
use lexc_cli::paths::{run_paths, PathsArgs};
use lexc_cli::validate::{run_validate, select_facet, ValidateArgs};
use lexc_cli::{load_lexicon, GlobalOptions};
use lexc_schema::compile_lexicon;
use serde_json::json;

const POST: &str = r#"{
  "lexicon": 1,
  "id": "com.example.post",
  "defs": {
    "main": {
      "type": "record",
      "key": "tid",
      "record": {
        "type": "object",
        "required": ["text"],
        "properties": {
          "text": { "type": "string", "maxLength": 10 },
          "author": { "type": "ref", "ref": "com.example.actor" },
          "langs": { "type": "array", "items": { "type": "string" } }
        }
      }
    },
    "list": {
      "type": "query",
      "parameters": { "type": "params", "properties": { "limit": { "type": "integer" } } },
      "output": {
        "encoding": "application/json",
        "schema": { "type": "object", "properties": { "cursor": { "type": "string" } } }
      }
    }
  }
}"#;

const ACTOR: &str = r#"
lexicon: 1
id: com.example.actor
defs:
  main:
    type: object
    required: [did]
    properties:
      did: { type: string }
"#;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("lexicons")).unwrap();
        fs::write(dir.path().join("lexicons").join("actor.yaml"), ACTOR).unwrap();
        fs::write(dir.path().join("post.json"), POST).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn global(&self) -> GlobalOptions {
        GlobalOptions {
            lexicon_dirs: vec![self.path("lexicons")],
            ..GlobalOptions::default()
        }
    }
}

fn validate_args(lexicon: &Path, instance: PathBuf, def: &str, facet: Option<&str>) -> ValidateArgs {
    ValidateArgs {
        lexicon: lexicon.to_path_buf(),
        def: def.to_string(),
        facet: facet.map(str::to_string),
        instance,
    }
}

#[test]
fn validate_accepts_and_rejects_records() {
    let ws = Workspace::new();
    let good = ws.write("good.json", r#"{ "text": "hi", "author": { "did": "did:plc:1" } }"#);
    let bad = ws.write("bad.yaml", "text: this text is too long\nauthor: {}\n");

    let code = run_validate(&validate_args(&ws.path("post.json"), good, "main", None), &ws.global()).unwrap();
    assert_eq!(code, 0);
    let code = run_validate(&validate_args(&ws.path("post.json"), bad, "main", None), &ws.global()).unwrap();
    assert_eq!(code, 1);
}

#[test]
fn validate_query_facets() {
    let ws = Workspace::new();
    let params = ws.write("params.json", r#"{ "limit": "5" }"#);
    let args = validate_args(&ws.path("post.json"), params.clone(), "list", Some("parameters"));
    assert_eq!(run_validate(&args, &ws.global()).unwrap(), 0);

    let args = validate_args(&ws.path("post.json"), params, "list", None);
    let err = run_validate(&args, &ws.global()).unwrap_err();
    assert!(format!("{err:#}").contains("--facet"));
}

#[test]
fn unresolved_reference_is_an_error_unless_refs_are_skipped() {
    let ws = Workspace::new();
    let instance = ws.write("i.json", r#"{ "text": "hi", "author": 1 }"#);
    let args = validate_args(&ws.path("post.json"), instance, "main", None);

    let err = run_validate(&args, &GlobalOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("com.example.actor"));

    let skip = GlobalOptions {
        no_follow_refs: true,
        ..GlobalOptions::default()
    };
    assert_eq!(run_validate(&args, &skip).unwrap(), 0);
}

#[test]
fn config_overrides_apply() {
    let ws = Workspace::new();
    let config = ws.write(
        "lexc.yaml",
        r#"
lexicon_dirs: [lexicons]
paths:
  main.record.text:
    required: false
  main.record.langs:
    omit: true
"#,
    );
    let global = GlobalOptions {
        config: Some(config),
        ..GlobalOptions::default()
    };
    let instance = ws.write("i.json", r#"{ "langs": 3 }"#);
    let args = validate_args(&ws.path("post.json"), instance, "main", None);
    assert_eq!(run_validate(&args, &global).unwrap(), 0);
}

#[test]
fn compile_writes_json_schema_export() {
    let ws = Workspace::new();
    let output = ws.path("out.json");
    let args = CompileArgs {
        lexicon: ws.path("post.json"),
        json_schema: true,
        output: Some(output.clone()),
    };
    assert_eq!(run_compile(&args, &ws.global()).unwrap(), 0);

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
    assert_eq!(exported["main"]["record"]["required"], json!(["text"]));
    assert_eq!(
        exported["main"]["record"]["properties"]["author"]["required"],
        json!(["did"])
    );
    assert_eq!(exported["list"]["output.encoding"]["const"], "application/json");
}

#[test]
fn export_covers_every_facet() {
    let ws = Workspace::new();
    let doc = load_lexicon(&ws.path("post.json")).unwrap();
    let compiled = compile_lexicon(&doc, ws.global().compile_options().unwrap()).unwrap();
    let exported = json_schema_export(&compiled);
    let list = exported["list"].as_object().unwrap();
    let facets: Vec<&str> = list.keys().map(String::as_str).collect();
    assert_eq!(facets, vec!["parameters", "output.encoding", "output.schema", "errors"]);
    assert!(select_facet(compiled.def("main").unwrap(), Some("nope")).is_err());
}

#[test]
fn paths_runs_with_and_without_dictionary() {
    let ws = Workspace::new();
    let args = PathsArgs {
        lexicon: ws.path("post.json"),
        json: true,
    };
    assert_eq!(run_paths(&args, &ws.global()).unwrap(), 0);
    assert_eq!(run_paths(&args, &GlobalOptions::default()).unwrap(), 0);
}

#[test]
fn missing_lexicon_file_is_an_error() {
    let ws = Workspace::new();
    let args = PathsArgs {
        lexicon: ws.path("missing.json"),
        json: false,
    };
    let err = run_paths(&args, &ws.global()).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}
