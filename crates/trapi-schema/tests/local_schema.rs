//! Integration test: a version reference naming a local schema file is
//! resolved, loaded through the fetcher and used for structural validation.

use std::io::Write;

use serde_json::json;
use trapi_schema::{
    FetchConfig, SchemaFetcher, SchemaLibrary, StructuralValidator, VersionResolver,
    VersionSelector,
};

const SCHEMA: &str = r#"
openapi: 3.0.1
info:
  title: Local TRAPI
  version: 1.4.0
components:
  schemas:
    Response:
      type: object
      properties:
        message:
          $ref: '#/components/schemas/Message'
        workflow:
          type: array
          items:
            $ref: '#/components/schemas/Operation'
          nullable: true
      required:
        - message
    Message:
      type: object
    Operation:
      type: object
      properties:
        id:
          type: string
      required:
        - id
      additionalProperties: false
"#;

fn schema_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("trapi_schema")
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    file.write_all(SCHEMA.as_bytes()).unwrap();
    file
}

#[test]
fn schema_file_reference_validates_documents() {
    let file = schema_file();
    let key = file.path().to_str().unwrap();

    let selector = VersionResolver::builtin().resolve(key).unwrap();
    assert!(matches!(selector, VersionSelector::FilePath(_)));

    let fetcher = SchemaFetcher::new(FetchConfig::local_mock(9300).unwrap()).unwrap();
    let library = SchemaLibrary::new(fetcher);

    let ok = library
        .validate(
            &json!({ "message": {}, "workflow": [{ "id": "lookup" }] }),
            "Response",
            &selector,
        )
        .unwrap();
    assert!(ok.is_empty(), "{ok:?}");

    let bad = library
        .validate(
            &json!({ "message": {}, "workflow": [{ "id": "lookup", "runner_parameters": {} }] }),
            "Response",
            &selector,
        )
        .unwrap();
    assert_eq!(bad.len(), 1, "{bad:?}");
}

#[test]
fn missing_schema_file_is_a_schema_error() {
    let library = SchemaLibrary::new(SchemaFetcher::new(FetchConfig::local_mock(9301).unwrap()).unwrap());
    let selector = VersionResolver::builtin()
        .resolve("/nonexistent/TranslatorReasonerAPI.yaml")
        .unwrap();
    let err = library
        .validate(&json!({ "message": {} }), "Response", &selector)
        .unwrap_err();
    assert!(err.to_string().contains("cannot read schema file"), "{err}");
}

#[test]
fn builtin_universe_resolves_shorthands() {
    let resolver = VersionResolver::builtin();
    assert_eq!(resolver.resolve("1").unwrap().to_string(), "1.4.2");
    assert_eq!(resolver.resolve("1.3").unwrap().to_string(), "1.3.0");
    assert_eq!(resolver.resolve("v1.4.0-beta3").unwrap().to_string(), "1.4.0-beta3");
    assert_eq!(resolver.resolve("1.4.0").unwrap().git_ref().unwrap(), "v1.4.0");
    assert!(resolver.resolve("2").is_err());
    assert_eq!(resolver.latest().unwrap().to_string(), "1.4.2");
}
