//! # Response Validation Pipeline
//!
//! Staged validation of one TRAPI response document:
//!
//! | Stage            | Stops the pipeline when                                   |
//! |------------------|-----------------------------------------------------------|
//! | `Presence`       | the response or its `message` is missing or empty         |
//! | `Structural`     | the envelope does not conform to the `Response` schema    |
//! | `Status`         | never (an unknown status is a warning)                    |
//! | `QueryGraph`     | the query graph is missing, empty or has errors           |
//! | `KnowledgeGraph` | the knowledge graph is missing, empty or has errors       |
//! | `Results`        | last stage                                                |
//!
//! ## Design
//!
//! Each stage reports into a catalog spawned from the run catalog and is
//! merged back when it ends, so the gate after a stage looks only at what
//! that stage found. The response is borrowed and never mutated: the
//! envelope is validated from a detached copy whose `message` is replaced
//! by `{}`, and large knowledge graphs are validated through a bounded
//! [`GraphSample`].

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use trapi_core::{CodeRegistry, Message, MessageCatalog, Severity};
use trapi_schema::{StructuralValidator, VersionResolver, VersionSelector};

use crate::collaborators::{
    IdentityResolver, MappingChecker, NodeEdgeMappingChecker, Ontology, StaticAliases,
    StaticOntology,
};
use crate::config::ValidatorConfig;
use crate::graph::{GraphChecker, GraphKind};
use crate::matcher::{BindingShape, EdgeMatcher, TestCase};
use crate::sample::{sample_results, GraphSample};

/// Response `status` values that need no comment.
pub const KNOWN_STATUSES: &[&str] = &["OK", "Success", "QueryNotTraversable", "KPsNotAvailable"];

// ─── Stage ──────────────────────────────────────────────────────────

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// The response carries a non-empty `message`.
    Presence,
    /// The envelope conforms to the `Response` schema.
    Structural,
    /// The response `status` is a known value.
    Status,
    /// `message.query_graph`
    QueryGraph,
    /// `message.knowledge_graph`
    KnowledgeGraph,
    /// `message.results`
    Results,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::Presence,
        Stage::Structural,
        Stage::Status,
        Stage::QueryGraph,
        Stage::KnowledgeGraph,
        Stage::Results,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Presence => "presence",
            Self::Structural => "structural",
            Self::Status => "status",
            Self::QueryGraph => "query_graph",
            Self::KnowledgeGraph => "knowledge_graph",
            Self::Results => "results",
        };
        f.write_str(name)
    }
}

/// Outcome of one stage: continue with the next one or stop here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Halt,
}

// ─── Report ─────────────────────────────────────────────────────────

/// Result of validating one response.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Every finding of the run.
    pub catalog: MessageCatalog,
    /// TRAPI version validated against, if one could be selected.
    pub trapi_version: Option<VersionSelector>,
    /// Biolink model version in effect, if known.
    pub biolink_version: Option<String>,
    /// Last stage that ran.
    pub reached: Stage,
    /// Stage that stopped the pipeline, if it did not run to the end.
    pub halted_at: Option<Stage>,
    /// Test case labels and whether the response witnessed them.
    pub witnessed: Vec<(String, bool)>,
}

impl ValidationReport {
    /// No error and no critical message was reported.
    pub fn passed(&self) -> bool {
        self.catalog.passed()
    }
}

// ─── Validator ──────────────────────────────────────────────────────

/// TRAPI response validator.
///
/// Holds the version universe and collaborators; each call to
/// [`validate`](Self::validate) is an independent run with its own catalog.
pub struct ResponseValidator {
    config: ValidatorConfig,
    resolver: VersionResolver,
    registry: Arc<CodeRegistry>,
    structural: Arc<dyn StructuralValidator + Send + Sync>,
    ontology: Option<Arc<dyn Ontology + Send + Sync>>,
    aliases: Arc<dyn IdentityResolver + Send + Sync>,
    mapping: Arc<dyn MappingChecker + Send + Sync>,
}

impl fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseValidator")
            .field("config", &self.config)
            .field("releases", &self.resolver.releases().len())
            .field("ontology", &self.ontology.is_some())
            .finish_non_exhaustive()
    }
}

impl ResponseValidator {
    /// A validator with no ontology, no aliases and the node/edge mapping
    /// checker.
    pub fn new(
        config: ValidatorConfig,
        resolver: VersionResolver,
        structural: Arc<dyn StructuralValidator + Send + Sync>,
    ) -> Self {
        Self {
            config,
            resolver,
            registry: CodeRegistry::builtin(),
            structural,
            ontology: None,
            aliases: Arc::new(StaticAliases::new()),
            mapping: Arc::new(NodeEdgeMappingChecker),
        }
    }

    /// Use an ontology for graph compliance checks and test case matching.
    pub fn with_ontology(mut self, ontology: Arc<dyn Ontology + Send + Sync>) -> Self {
        self.ontology = Some(ontology);
        self
    }

    /// Use an identity resolver for test case matching.
    pub fn with_aliases(mut self, aliases: Arc<dyn IdentityResolver + Send + Sync>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Replace the knowledge graph mapping checker.
    pub fn with_mapping_checker(mut self, mapping: Arc<dyn MappingChecker + Send + Sync>) -> Self {
        self.mapping = mapping;
        self
    }

    /// Report against a different code registry.
    pub fn with_registry(mut self, registry: Arc<CodeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Version universe in use.
    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// An empty catalog with this validator's registry and defaults.
    pub fn new_catalog(&self) -> MessageCatalog {
        MessageCatalog::with_defaults(
            Arc::clone(&self.registry),
            self.config.default_target.clone().unwrap_or_default(),
            self.config.default_test.clone().unwrap_or_default(),
        )
    }

    /// Validate one response.
    pub fn validate(&self, response: &Value) -> ValidationReport {
        let mut catalog = self.new_catalog();
        let trapi_version = self.select_version(response, &mut catalog);
        let biolink_version = self.config.biolink_version.clone().or_else(|| {
            response
                .get("biolink_version")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let mut report = ValidationReport {
            catalog,
            trapi_version,
            biolink_version,
            reached: Stage::Presence,
            halted_at: None,
            witnessed: Vec::new(),
        };

        let Some(version) = report.trapi_version.clone() else {
            report.halted_at = Some(Stage::Presence);
            return report;
        };

        tracing::info!(
            trapi_version = %version,
            biolink_version = report.biolink_version.as_deref().unwrap_or("unspecified"),
            "validating TRAPI response"
        );

        for stage in Stage::ALL {
            report.reached = stage;
            let mut stage_catalog = report.catalog.spawn();
            let flow = self.run_stage(stage, response, &version, &mut stage_catalog);
            report.catalog.merge(&stage_catalog);
            if flow == Flow::Halt {
                tracing::warn!(stage = %stage, "validation stopped");
                report.halted_at = Some(stage);
                break;
            }
            tracing::debug!(stage = %stage, "stage passed");
        }

        tracing::info!(
            passed = report.passed(),
            errors = report.catalog.count(Severity::Error),
            warnings = report.catalog.count(Severity::Warning),
            "TRAPI response validated"
        );
        report
    }

    /// Validate one response, then check that it witnesses every test
    /// case. Matching is skipped when the response has no message or a
    /// structurally invalid envelope.
    pub fn validate_with_test_cases(&self, response: &Value, cases: &[TestCase]) -> ValidationReport {
        let mut report = self.validate(response);
        let envelope_failed = matches!(
            report.halted_at,
            Some(Stage::Presence) | Some(Stage::Structural)
        );
        let Some(version) = report.trapi_version.as_ref().filter(|_| !envelope_failed) else {
            tracing::warn!(cases = cases.len(), "test case matching skipped");
            return report;
        };

        let fallback = StaticOntology::new();
        let ontology: &dyn Ontology = match &self.ontology {
            Some(ontology) => ontology.as_ref(),
            None => &fallback,
        };
        let matcher = EdgeMatcher::new(ontology, self.aliases.as_ref(), BindingShape::for_version(version));
        let witnessed = cases
            .iter()
            .map(|case| {
                let found = matcher.is_witnessed(case, response, &mut report.catalog);
                (case.label(), found)
            })
            .collect();
        report.witnessed = witnessed;
        report
    }

    // ─── Version selection ──────────────────────────────────────────

    fn select_version(&self, response: &Value, catalog: &mut MessageCatalog) -> Option<VersionSelector> {
        let selected = match &self.config.trapi_version {
            Some(key) => self.resolver.resolve_or_latest(key).ok(),
            None => match response.get("schema_version").and_then(Value::as_str) {
                Some(declared) => match self.resolver.resolve(declared) {
                    Ok(selector) => {
                        catalog.report(
                            "info.trapi.response.schema_version.override",
                            Message::identified(declared),
                        );
                        Some(selector)
                    }
                    Err(e) => {
                        tracing::warn!(declared, error = %e, "ignoring response schema_version");
                        self.latest()
                    }
                },
                None => self.latest(),
            },
        };

        if selected.is_none() {
            let requested = self.config.trapi_version.as_deref().unwrap_or("latest");
            tracing::error!(requested, "no TRAPI version could be selected");
            catalog.report(
                "critical.trapi.schema.unavailable",
                Message::identified(requested).param("reason", "no known TRAPI release"),
            );
        }
        selected
    }

    fn latest(&self) -> Option<VersionSelector> {
        self.resolver.latest().cloned().map(VersionSelector::Released)
    }

    // ─── Stages ─────────────────────────────────────────────────────

    fn run_stage(
        &self,
        stage: Stage,
        response: &Value,
        version: &VersionSelector,
        catalog: &mut MessageCatalog,
    ) -> Flow {
        match stage {
            Stage::Presence => self.check_presence(response, catalog),
            Stage::Structural => self.check_envelope(response, version, catalog),
            Stage::Status => self.check_status(response, catalog),
            Stage::QueryGraph => self.check_query_graph(response, version, catalog),
            Stage::KnowledgeGraph => self.check_knowledge_graph(response, version, catalog),
            Stage::Results => self.check_results(response, version, catalog),
        }
    }

    fn report_unless_suppressed(&self, catalog: &mut MessageCatalog, code: &str) {
        if !self.config.suppress_empty_data_warnings {
            catalog.report(code, Message::new());
        }
    }

    fn check_presence(&self, response: &Value, catalog: &mut MessageCatalog) -> Flow {
        match response.get("message") {
            None => {
                self.report_unless_suppressed(catalog, "error.trapi.response.empty");
                Flow::Halt
            }
            Some(message) if is_empty(message) => {
                self.report_unless_suppressed(catalog, "error.trapi.response.message.empty");
                Flow::Halt
            }
            Some(_) => Flow::Continue,
        }
    }

    fn check_envelope(&self, response: &Value, version: &VersionSelector, catalog: &mut MessageCatalog) -> Flow {
        let envelope = detached_envelope(response);
        self.check_component(&envelope, "Response", version, catalog);
        if catalog.has_severity(Severity::Critical) {
            Flow::Halt
        } else {
            Flow::Continue
        }
    }

    fn check_status(&self, response: &Value, catalog: &mut MessageCatalog) -> Flow {
        if let Some(status) = response.get("status").and_then(Value::as_str) {
            if !KNOWN_STATUSES.contains(&status) {
                catalog.report(
                    "warning.trapi.response.status.unknown",
                    Message::identified(status),
                );
            }
        }
        Flow::Continue
    }

    fn check_query_graph(&self, response: &Value, version: &VersionSelector, catalog: &mut MessageCatalog) -> Flow {
        let query_graph = match response.pointer("/message/query_graph") {
            None => {
                self.report_unless_suppressed(catalog, "error.trapi.response.message.query_graph.missing");
                return Flow::Halt;
            }
            Some(qg) if is_empty(qg) => {
                self.report_unless_suppressed(catalog, "error.trapi.response.message.query_graph.empty");
                return Flow::Halt;
            }
            Some(qg) => qg,
        };

        self.check_component(query_graph, "QueryGraph", version, catalog);
        self.check_graph(query_graph, GraphKind::QueryGraph, version, catalog);
        gate(catalog)
    }

    fn check_knowledge_graph(&self, response: &Value, version: &VersionSelector, catalog: &mut MessageCatalog) -> Flow {
        let Some(knowledge_graph) = response.pointer("/message/knowledge_graph") else {
            self.report_unless_suppressed(catalog, "error.trapi.response.message.knowledge_graph.missing");
            return Flow::Halt;
        };
        let has = |key: &str| {
            knowledge_graph
                .get(key)
                .and_then(Value::as_object)
                .is_some_and(|m| !m.is_empty())
        };
        if !has("nodes") || !has("edges") {
            self.report_unless_suppressed(catalog, "warning.trapi.response.message.knowledge_graph.empty");
            return Flow::Halt;
        }

        let mapping = self.mapping.check(knowledge_graph, catalog);
        catalog.merge(&mapping);

        let sample = GraphSample::from_graph(knowledge_graph, self.config.max_kg_edges).to_value();
        self.check_component(&sample, "KnowledgeGraph", version, catalog);
        self.check_graph(&sample, GraphKind::KnowledgeGraph, version, catalog);
        gate(catalog)
    }

    fn check_results(&self, response: &Value, version: &VersionSelector, catalog: &mut MessageCatalog) -> Flow {
        match response.pointer("/message/results") {
            None => {
                self.report_unless_suppressed(catalog, "error.trapi.response.message.results.missing")
            }
            Some(Value::Null) => {
                self.report_unless_suppressed(catalog, "warning.trapi.response.message.results.empty")
            }
            Some(Value::Array(results)) if results.is_empty() => {
                self.report_unless_suppressed(catalog, "warning.trapi.response.message.results.empty")
            }
            Some(Value::Array(results)) => {
                let sampled = sample_results(results, self.config.max_results);
                tracing::debug!(results = sampled.len(), of_results = results.len(), "validating results");
                for result in sampled {
                    self.check_component(result, "Result", version, catalog);
                }
            }
            Some(_) => catalog.report("error.trapi.response.message.results.not_array", Message::new()),
        }
        Flow::Continue
    }

    // ─── Shared checks ──────────────────────────────────────────────

    /// Structural validation of one component. Violations and schema
    /// trouble are both critical.
    fn check_component(
        &self,
        instance: &Value,
        component: &str,
        version: &VersionSelector,
        catalog: &mut MessageCatalog,
    ) {
        let version_id = version.to_string();
        match self.structural.validate(instance, component, version) {
            Ok(reasons) => {
                for reason in reasons {
                    catalog.report(
                        "critical.trapi.validation",
                        Message::identified(version_id.as_str())
                            .param("component", component)
                            .param("reason", reason),
                    );
                }
            }
            Err(e) => {
                tracing::error!(component, version = %version_id, error = %e, "structural validation unavailable");
                catalog.report(
                    "critical.trapi.schema.unavailable",
                    Message::identified(version_id.as_str()).param("reason", e.to_string()),
                );
            }
        }
    }

    fn check_graph(&self, graph: &Value, kind: GraphKind, version: &VersionSelector, catalog: &mut MessageCatalog) {
        if !self.config.validate_ontology {
            return;
        }
        if self.ontology.is_none() {
            catalog.report("skipped.graph.ontology", Message::identified(kind.label()));
        }
        let ontology = self.ontology.as_deref().map(|o| o as &dyn Ontology);
        GraphChecker::new(ontology, version).check(graph, kind, catalog);
    }
}

/// Stop after a stage that found errors.
fn gate(catalog: &MessageCatalog) -> Flow {
    if catalog.has_blocking() {
        Flow::Halt
    } else {
        Flow::Continue
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(list) => list.is_empty(),
        _ => false,
    }
}

/// Copy of the response envelope for structural validation: `message`
/// replaced by `{}`, workflow operations without empty parameter maps.
fn detached_envelope(response: &Value) -> Value {
    let Some(fields) = response.as_object() else {
        return response.clone();
    };
    let envelope: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| {
            let value = match key.as_str() {
                "message" => Value::Object(Map::new()),
                "workflow" => sanitize_workflow(value),
                _ => value.clone(),
            };
            (key.clone(), value)
        })
        .collect();
    Value::Object(envelope)
}

/// Drop null or empty `runner_parameters` and `parameters` from workflow
/// operations.
fn sanitize_workflow(workflow: &Value) -> Value {
    let Some(operations) = workflow.as_array() else {
        return workflow.clone();
    };
    let sanitized = operations
        .iter()
        .map(|operation| match operation {
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter(|(key, value)| {
                        !(matches!(key.as_str(), "runner_parameters" | "parameters") && is_empty(value))
                    })
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            other => other.clone(),
        })
        .collect();
    Value::Array(sanitized)
}
