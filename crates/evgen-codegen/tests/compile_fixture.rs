//! End-to-end compile of the analytics fixture: one shared base schema and
//! two events extending it, written to disk, compiled to TypeScript.

use std::path::{Path, PathBuf};

use evgen_codegen::{compile, render_module, CompileError};
use evgen_schema::ComposeError;

const BASE_TYPE: &str = "title: BaseType
type: object
properties:
  eventName:
    type: string
additionalProperties: false
required:
- eventName
";

const POST: &str = "title: sends a post
type: object
properties:
  title:
    type: string
  content:
    type: string
extends:
  $ref: './BaseType.yml'
additionalProperties: false
required:
- title
- content
";

const USER: &str = "title: registers a user
type: object
properties:
  firstName:
    type: string
  lastName:
    type: string
  age:
    description: Age in years
    type: integer
    minimum: 0
  hairColor:
    enum:
    - black
    - brown
    - blue
    type: string
extends:
  $ref: './BaseType.yml'
additionalProperties: false
required:
- firstName
- lastName
";

fn fixture(files: &[(&str, &str)]) -> (tempfile::TempDir, String, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    std::fs::create_dir_all(&schemas).unwrap();
    for (name, text) in files {
        std::fs::write(schemas.join(name), text).unwrap();
    }
    let pattern = format!("{}/*.yml", schemas.display());
    let output = dir.path().join("analytics.ts");
    (dir, pattern, output)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn test_fixture_compiles_to_factories() {
    let (_dir, pattern, output) = fixture(&[
        ("BaseType.yml", BASE_TYPE),
        ("Post.yml", POST),
        ("User.yml", USER),
    ]);

    let report = compile(&pattern, &output).unwrap();
    assert_eq!(report.documents, 3);
    assert_eq!(report.events, 3);

    let module = read(&output);
    assert_eq!(report.bytes, module.len());
    assert!(module.contains("export const makeRegistersAUser = ({"));
    assert!(module.contains("export const makeSendsAPost = ({"));
    assert!(module.contains("export const makeBaseType = ({"));

    // Inherited and own properties, with optionality from the merged `required`.
    assert!(module.contains(
        "export interface RegistersAUserProperties {
  /** Age in years */
  age?: number;
  eventName: string;
  firstName: string;
  hairColor?: \"black\" | \"brown\" | \"blue\";
  lastName: string;
}
"
    ));
    assert!(module.contains(
        "export interface SendsAPostProperties {
  content: string;
  eventName: string;
  title: string;
}
"
    ));

    // The factory passes its arguments through and stamps the title.
    assert!(module.contains(
        "}): RegistersAUserEvent => ({
  event: \"registers a user\",
  userId,
  anonymousId,
  properties,
});
"
    ));
}

#[test]
fn test_render_module_matches_written_file() {
    let (_dir, pattern, output) = fixture(&[
        ("BaseType.yml", BASE_TYPE),
        ("Post.yml", POST),
        ("User.yml", USER),
    ]);
    compile(&pattern, &output).unwrap();
    assert_eq!(render_module(&pattern).unwrap(), read(&output));
}

#[test]
fn test_recompile_overwrites_output() {
    let (dir, pattern, output) = fixture(&[("BaseType.yml", BASE_TYPE)]);
    std::fs::write(&output, "stale contents").unwrap();
    compile(&pattern, &output).unwrap();
    assert!(!read(&output).contains("stale"));

    std::fs::write(dir.path().join("schemas/Post.yml"), POST).unwrap();
    let report = compile(&pattern, &output).unwrap();
    assert_eq!(report.events, 2);
    assert!(read(&output).contains("makeSendsAPost"));
}

#[test]
fn test_missing_reference_writes_nothing() {
    let (_dir, pattern, output) = fixture(&[("Post.yml", POST)]);
    let err = compile(&pattern, &output).unwrap_err();
    match &err {
        CompileError::Compose(ComposeError::UnresolvedReference { referrer, target }) => {
            assert!(referrer.as_str().ends_with("/schemas/Post.yml"));
            assert!(target.as_str().ends_with("/schemas/BaseType.yml"));
        }
        other => panic!("expected UnresolvedReference, got: {other}"),
    }
    assert!(err.to_string().contains("BaseType.yml"));
    assert!(!output.exists());
}

#[test]
fn test_cycle_writes_nothing_and_keeps_previous_output() {
    let (_dir, pattern, output) = fixture(&[
        ("A.yml", "title: a\nextends:\n  $ref: './B.yml'\n"),
        ("B.yml", "title: b\nextends:\n  $ref: './A.yml'\n"),
    ]);
    std::fs::write(&output, "previous").unwrap();

    let err = compile(&pattern, &output).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Compose(ComposeError::ReferenceCycle { .. })
    ));
    let message = err.to_string();
    assert!(message.contains("A.yml"));
    assert!(message.contains("B.yml"));
    assert_eq!(read(&output), "previous");
}

#[test]
fn test_pattern_matching_nothing() {
    let (_dir, pattern, output) = fixture(&[]);
    let err = compile(&pattern, &output).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Compose(ComposeError::NoDocuments { .. })
    ));
    assert!(!output.exists());
}

#[test]
fn test_json_documents_compile_alongside_yaml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("BaseType.yml"), BASE_TYPE).unwrap();
    std::fs::write(
        dir.path().join("Click.json"),
        r#"{
  "title": "clicks a button",
  "type": "object",
  "extends": {"$ref": "./BaseType.yml"},
  "properties": {"button": {"type": "string"}},
  "additionalProperties": false
}"#,
    )
    .unwrap();
    let output = dir.path().join("out.ts");
    let report = compile(&format!("{}/*.*", dir.path().display()), &output).unwrap();
    assert_eq!(report.events, 2);
    let module = read(&output);
    assert!(module.contains("export interface ClicksAButtonProperties {\n  button?: string;\n  eventName: string;\n}\n"));
}
