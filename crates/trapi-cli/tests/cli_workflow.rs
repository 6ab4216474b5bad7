//! Integration test: the `response` subcommand against a local schema
//! document, from argument parsing to exit code.

use clap::Parser;
use serde_json::{json, Value};
use trapi_cli::response::{report_json, run_response, ResponseArgs};
use trapi_cli::{EXIT_FAILED, EXIT_PASSED};

const PERMISSIVE_SCHEMA: &str = r#"
openapi: 3.0.1
info:
  title: Local TRAPI
  version: 1.5.0
components:
  schemas:
    Response:
      type: object
      properties:
        message:
          $ref: '#/components/schemas/Message'
      required:
        - message
    Message:
      type: object
    QueryGraph:
      type: object
      required:
        - nodes
        - edges
    KnowledgeGraph:
      type: object
      required:
        - nodes
        - edges
    Result:
      type: object
      required:
        - node_bindings
"#;

#[derive(Parser, Debug)]
struct Harness {
    #[command(flatten)]
    args: ResponseArgs,
}

fn response(with_sources: bool) -> Value {
    let mut edge = json!({
        "subject": "PUBCHEM.COMPOUND:4091",
        "predicate": "biolink:treats",
        "object": "MONDO:0005148"
    });
    if with_sources {
        edge["sources"] = json!([{ "resource_id": "infores:ctd", "resource_role": "primary_knowledge_source" }]);
    }
    json!({
        "status": "Success",
        "message": {
            "query_graph": {
                "nodes": { "a": { "ids": ["PUBCHEM.COMPOUND:4091"] }, "b": {} },
                "edges": { "ab": { "subject": "a", "object": "b" } }
            },
            "knowledge_graph": {
                "nodes": {
                    "PUBCHEM.COMPOUND:4091": { "categories": ["biolink:SmallMolecule"] },
                    "MONDO:0005148": { "categories": ["biolink:Disease"] }
                },
                "edges": { "e0": edge }
            },
            "results": [{
                "node_bindings": {
                    "a": [{ "id": "PUBCHEM.COMPOUND:4091" }],
                    "b": [{ "id": "MONDO:0005148" }]
                }
            }]
        }
    })
}

struct Workspace {
    _dir: tempfile::TempDir,
    schema: String,
    reply: String,
}

fn workspace(with_sources: bool) -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let schema = dir.path().join("trapi.yaml");
    std::fs::write(&schema, PERMISSIVE_SCHEMA).unwrap();
    let reply = dir.path().join("reply.json");
    std::fs::write(&reply, serde_json::to_string(&response(with_sources)).unwrap()).unwrap();
    Workspace {
        schema: schema.to_str().unwrap().to_string(),
        reply: reply.to_str().unwrap().to_string(),
        _dir: dir,
    }
}

fn args(ws: &Workspace, extra: &[&str]) -> ResponseArgs {
    let mut argv = vec!["response", ws.reply.as_str(), "--schema", ws.schema.as_str(), "--json"];
    argv.extend_from_slice(extra);
    Harness::try_parse_from(argv).unwrap().args
}

#[test]
fn compliant_response_against_local_schema_passes() {
    let ws = workspace(true);
    assert_eq!(run_response(&args(&ws, &[])).unwrap(), EXIT_PASSED);
}

#[test]
fn edge_without_sources_fails() {
    let ws = workspace(false);
    assert_eq!(run_response(&args(&ws, &[])).unwrap(), EXIT_FAILED);
}

#[test]
fn suppressed_warnings_do_not_change_a_passing_verdict() {
    let ws = workspace(true);
    let a = args(&ws, &["--suppress-empty-data-warnings", "--max-kg-edges", "1"]);
    assert_eq!(run_response(&a).unwrap(), EXIT_PASSED);
}

#[test]
fn json_report_carries_the_verdict_and_catalog() {
    let ws = workspace(false);
    let a = args(&ws, &[]);
    let config = a.validator_config().unwrap();
    assert_eq!(config.trapi_version.as_deref(), Some(ws.schema.as_str()));

    let validator = trapi_validator::ResponseValidator::new(
        config,
        trapi_schema::VersionResolver::builtin(),
        std::sync::Arc::new(trapi_schema::SchemaLibrary::new(
            trapi_schema::SchemaFetcher::new(trapi_schema::FetchConfig::from_env().unwrap()).unwrap(),
        )),
    );
    let report = validator.validate(&response(false));
    let document = report_json(&report).unwrap();
    assert_eq!(document["passed"], false);
    assert!(document["messages"].is_object());
    assert_eq!(document["halted_at"], "knowledge_graph");
}
