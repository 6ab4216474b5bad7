//! # Test Edge Matcher
//!
//! Decides whether a TRAPI response witnesses a test case triple
//! `(subject, predicate, object)`. Matching is ontology aware: node
//! identifiers are matched through their aliases and, failing that, their
//! parent concept; categories and predicates match through the hierarchy;
//! an edge asserted with the inverse predicate in the opposite direction
//! witnesses the triple too.
//!
//! ## Design
//!
//! Messages are staged in a scratch catalog spawned from the caller's.
//! A witnessed triple commits its warnings (imprecise categories). A
//! triple that is not witnessed commits only the error that stopped the
//! search: the missing node, the missing edge or the missing result.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use trapi_core::{Message, MessageCatalog};
use trapi_schema::version::trapi_1_4_0_beta;
use trapi_schema::VersionSelector;

use crate::collaborators::{IdentityResolver, Ontology};
use crate::error::{load_yaml_file, LoadError};

// ─── Test cases ─────────────────────────────────────────────────────

/// One triple expected in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Position of the case within its test asset.
    #[serde(default)]
    pub idx: u64,
    /// Subject CURIE.
    #[serde(alias = "subject")]
    pub subject_id: String,
    /// Expected category of the subject.
    pub subject_category: String,
    /// Object CURIE.
    #[serde(alias = "object")]
    pub object_id: String,
    /// Expected category of the object.
    pub object_category: String,
    /// Expected predicate.
    #[serde(alias = "predicate_id")]
    pub predicate: String,
}

impl TestCase {
    /// A test case at index 0.
    pub fn new(
        subject_id: impl Into<String>,
        subject_category: impl Into<String>,
        predicate: impl Into<String>,
        object_id: impl Into<String>,
        object_category: impl Into<String>,
    ) -> Self {
        Self {
            idx: 0,
            subject_id: subject_id.into(),
            subject_category: subject_category.into(),
            object_id: object_id.into(),
            object_category: object_category.into(),
            predicate: predicate.into(),
        }
    }

    /// Identifier of the case in messages:
    /// `idx|(subject#category)-[predicate]->(object#category)`.
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Parse a YAML (or JSON) list of test cases.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed documents.
    pub fn list_from_yaml_str(text: &str) -> Result<Vec<Self>, LoadError> {
        serde_yaml::from_str(text).map_err(|source| LoadError::Parse {
            what: "test cases",
            source,
        })
    }

    /// Load a YAML (or JSON) list of test cases.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] or [`LoadError::Parse`].
    pub fn list_from_file(path: &Path) -> Result<Vec<Self>, LoadError> {
        load_yaml_file(path, "test cases")
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|({}#{})-[{}]->({}#{})",
            self.idx,
            self.subject_id,
            self.subject_category,
            self.predicate,
            self.object_id,
            self.object_category
        )
    }
}

// ─── Binding shape ──────────────────────────────────────────────────

/// Where results keep their edge bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingShape {
    /// `result.edge_bindings` (TRAPI before 1.4.0-beta).
    Legacy,
    /// `result.analyses[*].edge_bindings` (TRAPI 1.4.0-beta and later).
    Analysis,
}

impl BindingShape {
    /// Shape used by a TRAPI version. Branches and schema files track the
    /// current layout.
    pub fn for_version(version: &VersionSelector) -> Self {
        match version.is_at_least(&trapi_1_4_0_beta()) {
            Some(false) => Self::Legacy,
            Some(true) | None => Self::Analysis,
        }
    }
}

// ─── Matcher ────────────────────────────────────────────────────────

/// A knowledge graph edge witnessing a test case, with the resolved
/// knowledge graph node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeWitness {
    /// Knowledge graph edge id.
    pub edge_id: String,
    /// Node resolved for the test case subject.
    pub subject: String,
    /// Node resolved for the test case object.
    pub object: String,
    /// Predicate of the witnessing edge.
    pub predicate: String,
}

/// Ontology-aware test case matcher for one run.
pub struct EdgeMatcher<'a> {
    ontology: &'a dyn Ontology,
    aliases: &'a dyn IdentityResolver,
    shape: BindingShape,
}

/// The non-empty parts of a message needed for matching.
struct MatchInputs<'v> {
    query_edges: Option<&'v Map<String, Value>>,
    nodes: &'v Map<String, Value>,
    edges: &'v Map<String, Value>,
    results: &'v [Value],
}

impl<'a> EdgeMatcher<'a> {
    /// A matcher for responses with the given binding shape.
    pub fn new(
        ontology: &'a dyn Ontology,
        aliases: &'a dyn IdentityResolver,
        shape: BindingShape,
    ) -> Self {
        Self {
            ontology,
            aliases,
            shape,
        }
    }

    /// Binding shape in use.
    pub fn shape(&self) -> BindingShape {
        self.shape
    }

    /// Whether `response` witnesses `case`.
    pub fn is_witnessed(&self, case: &TestCase, response: &Value, catalog: &mut MessageCatalog) -> bool {
        self.witness(case, response, catalog).is_some()
    }

    /// Find the knowledge graph edge witnessing `case`, bound in some
    /// result. Findings are reported into `catalog`.
    pub fn witness(
        &self,
        case: &TestCase,
        response: &Value,
        catalog: &mut MessageCatalog,
    ) -> Option<EdgeWitness> {
        let label = case.label();
        let inputs = match_inputs(response, &label, catalog)?;
        let mut scratch = catalog.spawn();

        let Some(subject) = self.resolve_node(
            &case.subject_id,
            &case.subject_category,
            inputs.nodes,
            &mut scratch,
        ) else {
            return self.fail(catalog, &label, node_missing(&case.subject_id, "subject"));
        };
        let Some(object) = self.resolve_node(
            &case.object_id,
            &case.object_category,
            inputs.nodes,
            &mut scratch,
        ) else {
            return self.fail(catalog, &label, node_missing(&case.object_id, "object"));
        };

        let Some(witness) = self.find_edge(&case.predicate, &subject, &object, inputs.edges) else {
            return self.fail(
                catalog,
                &label,
                (
                    "error.trapi.response.message.knowledge_graph.edge.missing",
                    Message::identified(label.as_str()),
                ),
            );
        };

        if !self.is_bound(&witness, inputs.query_edges, inputs.results) {
            return self.fail(
                catalog,
                &label,
                (
                    "error.trapi.response.message.result.missing",
                    Message::identified(label.as_str()),
                ),
            );
        }

        tracing::debug!(case = %label, edge = %witness.edge_id, "test case witnessed");
        catalog.merge(&scratch);
        Some(witness)
    }

    fn fail(
        &self,
        catalog: &mut MessageCatalog,
        label: &str,
        (code, message): (&'static str, Message),
    ) -> Option<EdgeWitness> {
        tracing::debug!(case = %label, code, "test case not witnessed");
        catalog.report(code, message);
        None
    }

    // ─── Nodes ──────────────────────────────────────────────────────

    /// Knowledge graph node matching `id` (or an alias, or its parent
    /// concept) with a compatible category.
    fn resolve_node(
        &self,
        id: &str,
        category: &str,
        nodes: &Map<String, Value>,
        scratch: &mut MessageCatalog,
    ) -> Option<String> {
        if let Some(found) = self.match_aliases(id, category, nodes, scratch) {
            return Some(found);
        }
        let parent = self.ontology.parent_concept(id, category)?;
        tracing::debug!(id, parent = %parent, "retrying node match with parent concept");
        self.match_aliases(&parent, category, nodes, scratch)
    }

    fn match_aliases(
        &self,
        id: &str,
        category: &str,
        nodes: &Map<String, Value>,
        scratch: &mut MessageCatalog,
    ) -> Option<String> {
        let expected_ancestors = self.ontology.ancestors(category);
        for alias in self.aliases.aliases(id) {
            let Some(node) = nodes.get(&alias) else {
                continue;
            };
            let observed: Vec<&str> = node
                .get("categories")
                .and_then(Value::as_array)
                .map(|c| c.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            let precise = observed.iter().any(|c| {
                *c == category || self.ontology.ancestors(c).iter().any(|a| a == category)
            });
            if precise {
                return Some(alias);
            }

            let imprecise = observed
                .iter()
                .any(|c| expected_ancestors.iter().any(|a| a.as_str() == *c));
            if imprecise {
                scratch.report(
                    "warning.trapi.response.message.knowledge_graph.node.category.imprecise",
                    Message::identified(alias.as_str())
                        .param("expected_category", category)
                        .param("observed_categories", observed.join(",")),
                );
                return Some(alias);
            }
        }
        None
    }

    // ─── Edges ──────────────────────────────────────────────────────

    /// First edge, in source order, joining the resolved nodes with the
    /// predicate (or a descendant), or joining them in reverse with the
    /// inverse predicate (or a descendant).
    fn find_edge(
        &self,
        predicate: &str,
        subject: &str,
        object: &str,
        edges: &Map<String, Value>,
    ) -> Option<EdgeWitness> {
        let forward = self.with_descendants(predicate);
        let inverse = self
            .ontology
            .inverse(predicate)
            .map(|inverse| self.with_descendants(&inverse))
            .unwrap_or_default();

        edges.iter().find_map(|(edge_id, edge)| {
            let s = edge.get("subject").and_then(Value::as_str)?;
            let p = edge.get("predicate").and_then(Value::as_str)?;
            let o = edge.get("object").and_then(Value::as_str)?;
            let forward_match = s == subject && o == object && forward.iter().any(|f| f == p);
            let inverse_match = s == object && o == subject && inverse.iter().any(|i| i == p);
            (forward_match || inverse_match).then(|| EdgeWitness {
                edge_id: edge_id.clone(),
                subject: subject.to_string(),
                object: object.to_string(),
                predicate: p.to_string(),
            })
        })
    }

    fn with_descendants(&self, predicate: &str) -> Vec<String> {
        let mut all = self.ontology.descendants(predicate);
        if !all.iter().any(|d| d == predicate) {
            all.push(predicate.to_string());
        }
        all
    }

    // ─── Results ────────────────────────────────────────────────────

    fn is_bound(
        &self,
        witness: &EdgeWitness,
        query_edges: Option<&Map<String, Value>>,
        results: &[Value],
    ) -> bool {
        let Some(query_edges) = query_edges else {
            return false;
        };
        results.iter().any(|result| {
            let bound_nodes = bound_ids(result.get("node_bindings"));
            if !bound_nodes.contains(&witness.subject.as_str())
                || !bound_nodes.contains(&witness.object.as_str())
            {
                return false;
            }
            self.edge_binding_sets(result).into_iter().any(|bindings| {
                query_edges.keys().any(|qedge| {
                    bound_ids(bindings.get(qedge.as_str())).contains(&witness.edge_id.as_str())
                })
            })
        })
    }

    fn edge_binding_sets<'v>(&self, result: &'v Value) -> Vec<&'v Map<String, Value>> {
        match self.shape {
            BindingShape::Legacy => result
                .get("edge_bindings")
                .and_then(Value::as_object)
                .into_iter()
                .collect(),
            BindingShape::Analysis => result
                .get("analyses")
                .and_then(Value::as_array)
                .map(|analyses| {
                    analyses
                        .iter()
                        .filter_map(|a| a.get("edge_bindings").and_then(Value::as_object))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Every `id` bound in a node or edge binding map, or in one binding list.
fn bound_ids(bindings: Option<&Value>) -> Vec<&str> {
    fn ids(list: &[Value]) -> impl Iterator<Item = &str> {
        list.iter().filter_map(|b| b.get("id").and_then(Value::as_str))
    }
    match bindings {
        Some(Value::Array(list)) => ids(list).collect(),
        Some(Value::Object(map)) => map
            .values()
            .filter_map(Value::as_array)
            .flat_map(|list| ids(list))
            .collect(),
        _ => Vec::new(),
    }
}

fn node_missing(id: &str, context: &str) -> (&'static str, Message) {
    (
        "error.trapi.response.message.knowledge_graph.node.missing",
        Message::identified(id).param("context", context),
    )
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(list) => list.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Check the message parts the matcher needs, reporting the first one
/// missing or empty.
fn match_inputs<'v>(
    response: &'v Value,
    label: &str,
    catalog: &mut MessageCatalog,
) -> Option<MatchInputs<'v>> {
    let mut fail = |code: &str| {
        catalog.report(code, Message::identified(label));
        None
    };

    let Some(message) = response.get("message") else {
        return fail("error.trapi.response.empty");
    };
    if is_empty_value(message) {
        return fail("error.trapi.response.message.empty");
    }

    let query_edges = match message.get("query_graph") {
        None => return fail("error.trapi.response.message.query_graph.missing"),
        Some(qg) if is_empty_value(qg) => {
            return fail("error.trapi.response.message.query_graph.empty")
        }
        Some(qg) => qg.get("edges").and_then(Value::as_object),
    };

    let (nodes, edges) = match message.get("knowledge_graph") {
        None => return fail("error.trapi.response.message.knowledge_graph.missing"),
        Some(kg) => (
            kg.get("nodes").and_then(Value::as_object).filter(|m| !m.is_empty()),
            kg.get("edges").and_then(Value::as_object).filter(|m| !m.is_empty()),
        ),
    };
    let (Some(nodes), Some(edges)) = (nodes, edges) else {
        return fail("error.trapi.response.message.knowledge_graph.empty");
    };

    let results = match message.get("results") {
        None => return fail("error.trapi.response.message.results.missing"),
        Some(Value::Array(results)) if !results.is_empty() => results.as_slice(),
        Some(Value::Array(_)) | Some(Value::Null) => {
            return fail("error.trapi.response.message.results.empty")
        }
        Some(_) => return fail("error.trapi.response.message.results.not_array"),
    };

    Some(MatchInputs {
        query_edges,
        nodes,
        edges,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{StaticAliases, StaticOntology};
    use serde_json::json;
    use trapi_core::Severity;
    use trapi_schema::SemVer;

    fn ontology() -> StaticOntology {
        StaticOntology::new()
            .with_term("biolink:Gene", &["biolink:BiologicalEntity"])
            .with_term("biolink:BiologicalEntity", &["biolink:NamedThing"])
            .with_term("biolink:Disease", &["biolink:NamedThing"])
            .with_term("biolink:related_to", &[])
            .with_term("biolink:affects", &["biolink:related_to"])
            .with_term("biolink:regulates", &["biolink:affects"])
            .with_term("biolink:affected_by", &["biolink:related_to"])
            .with_inverse("biolink:affects", "biolink:affected_by")
            .with_parent_concept("MONDO:0005148", "MONDO:0005015")
    }

    fn case() -> TestCase {
        TestCase::new("A", "biolink:Gene", "biolink:affects", "B", "biolink:Disease")
    }

    fn response(edge: Value, shape: BindingShape) -> Value {
        let edge_bindings = json!({ "qe0": [{ "id": "e0" }] });
        let result = match shape {
            BindingShape::Legacy => json!({
                "node_bindings": { "qn0": [{ "id": "A" }], "qn1": [{ "id": "B" }] },
                "edge_bindings": edge_bindings
            }),
            BindingShape::Analysis => json!({
                "node_bindings": { "qn0": [{ "id": "A" }], "qn1": [{ "id": "B" }] },
                "analyses": [{ "resource_id": "infores:ara", "edge_bindings": edge_bindings }]
            }),
        };
        json!({
            "message": {
                "query_graph": {
                    "nodes": { "qn0": { "ids": ["A"] }, "qn1": { "categories": ["biolink:Disease"] } },
                    "edges": { "qe0": { "subject": "qn0", "object": "qn1" } }
                },
                "knowledge_graph": {
                    "nodes": {
                        "A": { "categories": ["biolink:Gene"] },
                        "B": { "categories": ["biolink:Disease"] }
                    },
                    "edges": { "e0": edge }
                },
                "results": [result]
            }
        })
    }

    fn forward_edge() -> Value {
        json!({ "subject": "A", "predicate": "biolink:affects", "object": "B" })
    }

    fn run(case: &TestCase, response: &Value, shape: BindingShape) -> (Option<EdgeWitness>, MessageCatalog) {
        let ontology = ontology();
        let aliases = StaticAliases::new().with_group(&["A", "HGNC:A"]);
        let matcher = EdgeMatcher::new(&ontology, &aliases, shape);
        let mut catalog = MessageCatalog::default();
        let witness = matcher.witness(case, response, &mut catalog);
        (witness, catalog)
    }

    #[test]
    fn witnesses_a_direct_edge() {
        let (witness, catalog) = run(&case(), &response(forward_edge(), BindingShape::Analysis), BindingShape::Analysis);
        let witness = witness.unwrap();
        assert_eq!(witness.edge_id, "e0");
        assert_eq!((witness.subject.as_str(), witness.object.as_str()), ("A", "B"));
        assert!(!catalog.has_messages());
    }

    #[test]
    fn witnesses_a_descendant_predicate() {
        let edge = json!({ "subject": "A", "predicate": "biolink:regulates", "object": "B" });
        let (witness, _) = run(&case(), &response(edge, BindingShape::Legacy), BindingShape::Legacy);
        assert_eq!(witness.unwrap().predicate, "biolink:regulates");
    }

    #[test]
    fn witnesses_an_inverse_edge() {
        let edge = json!({ "subject": "B", "predicate": "biolink:affected_by", "object": "A" });
        let (witness, catalog) = run(&case(), &response(edge, BindingShape::Legacy), BindingShape::Legacy);
        assert!(witness.is_some());
        assert!(catalog.passed());
    }

    #[test]
    fn inverse_predicate_in_forward_direction_is_not_a_witness() {
        let edge = json!({ "subject": "A", "predicate": "biolink:affected_by", "object": "B" });
        let (witness, catalog) = run(&case(), &response(edge, BindingShape::Legacy), BindingShape::Legacy);
        assert!(witness.is_none());
        assert!(catalog.contains_code("error.trapi.response.message.knowledge_graph.edge.missing"));
    }

    #[test]
    fn wrong_object_is_a_missing_edge() {
        let mut response = response(forward_edge(), BindingShape::Legacy);
        response["message"]["knowledge_graph"]["nodes"]["C"] = json!({ "categories": ["biolink:Disease"] });
        let mut wrong = case();
        wrong.object_id = "C".into();
        let (witness, catalog) = run(&wrong, &response, BindingShape::Legacy);
        assert!(witness.is_none());
        assert_eq!(
            catalog
                .occurrences("error.trapi.response.message.knowledge_graph.edge.missing", &wrong.label())
                .len(),
            1
        );
        assert_eq!(catalog.count(Severity::Error), 1);
    }

    #[test]
    fn edge_to_another_object_is_a_missing_edge() {
        let edge = json!({ "subject": "A", "predicate": "biolink:affects", "object": "C" });
        let mut response = response(edge, BindingShape::Legacy);
        response["message"]["knowledge_graph"]["nodes"]["C"] = json!({ "categories": ["biolink:Disease"] });
        let (witness, catalog) = run(&case(), &response, BindingShape::Legacy);
        assert!(witness.is_none());
        assert_eq!(
            catalog
                .occurrences("error.trapi.response.message.knowledge_graph.edge.missing", &case().label())
                .len(),
            1
        );
        assert_eq!(catalog.count(Severity::Error), 1);
        assert!(!catalog.has_severity(Severity::Warning));
    }

    #[test]
    fn unknown_node_is_missing() {
        let mut wrong = case();
        wrong.subject_id = "Z".into();
        let (witness, catalog) = run(&wrong, &response(forward_edge(), BindingShape::Legacy), BindingShape::Legacy);
        assert!(witness.is_none());
        let missing = catalog.occurrences("error.trapi.response.message.knowledge_graph.node.missing", "Z");
        assert_eq!(missing[0].parameters()[0]["context"], "subject");
    }

    #[test]
    fn aliases_resolve_nodes() {
        let mut aliased = case();
        aliased.subject_id = "HGNC:A".into();
        let (witness, _) = run(&aliased, &response(forward_edge(), BindingShape::Legacy), BindingShape::Legacy);
        assert_eq!(witness.unwrap().subject, "A");
    }

    #[test]
    fn parent_concept_is_tried_once() {
        let mut response = response(forward_edge(), BindingShape::Legacy);
        let message = &mut response["message"];
        message["knowledge_graph"]["nodes"]["MONDO:0005015"] = json!({ "categories": ["biolink:Disease"] });
        message["knowledge_graph"]["edges"]["e0"]["object"] = json!("MONDO:0005015");
        message["results"][0]["node_bindings"]["qn1"] = json!([{ "id": "MONDO:0005015" }]);

        let mut specific = case();
        specific.object_id = "MONDO:0005148".into();
        let (witness, _) = run(&specific, &response, BindingShape::Legacy);
        assert_eq!(witness.unwrap().object, "MONDO:0005015");
    }

    #[test]
    fn broader_node_category_is_an_imprecise_match() {
        let mut response = response(forward_edge(), BindingShape::Legacy);
        response["message"]["knowledge_graph"]["nodes"]["A"] = json!({ "categories": ["biolink:BiologicalEntity"] });
        let (witness, catalog) = run(&case(), &response, BindingShape::Legacy);
        assert!(witness.is_some());
        assert!(catalog.passed());
        let imprecise = catalog.occurrences(
            "warning.trapi.response.message.knowledge_graph.node.category.imprecise",
            "A",
        );
        assert_eq!(imprecise[0].parameters()[0]["expected_category"], "biolink:Gene");
        assert_eq!(imprecise[0].parameters()[0]["observed_categories"], "biolink:BiologicalEntity");
    }

    #[test]
    fn warnings_are_dropped_when_the_case_fails() {
        let mut response = response(forward_edge(), BindingShape::Legacy);
        response["message"]["knowledge_graph"]["nodes"]["A"] = json!({ "categories": ["biolink:BiologicalEntity"] });
        response["message"]["results"][0]["edge_bindings"] = json!({ "qe0": [{ "id": "other" }] });
        let (witness, catalog) = run(&case(), &response, BindingShape::Legacy);
        assert!(witness.is_none());
        assert!(!catalog.has_severity(Severity::Warning));
        assert!(catalog.contains_code("error.trapi.response.message.result.missing"));
    }

    #[test]
    fn binding_shape_must_match_the_results() {
        let legacy = response(forward_edge(), BindingShape::Legacy);
        let (witness, catalog) = run(&case(), &legacy, BindingShape::Analysis);
        assert!(witness.is_none());
        assert!(catalog.contains_code("error.trapi.response.message.result.missing"));
    }

    #[test]
    fn preconditions_report_the_first_missing_part() {
        let cases = [
            (json!({}), "error.trapi.response.empty"),
            (json!({ "message": {} }), "error.trapi.response.message.empty"),
            (json!({ "message": { "results": [] } }), "error.trapi.response.message.query_graph.missing"),
            (
                json!({ "message": { "query_graph": null, "knowledge_graph": {}, "results": [] } }),
                "error.trapi.response.message.query_graph.empty",
            ),
            (
                json!({ "message": { "query_graph": { "nodes": {} }, "knowledge_graph": { "nodes": {}, "edges": {} } } }),
                "error.trapi.response.message.knowledge_graph.empty",
            ),
        ];
        for (response, code) in cases {
            let (witness, catalog) = run(&case(), &response, BindingShape::Legacy);
            assert!(witness.is_none());
            assert!(catalog.contains_code(code), "{code}");
            assert_eq!(catalog.count(Severity::Error), 1, "{code}");
        }

        let mut no_results = response(forward_edge(), BindingShape::Legacy);
        no_results["message"]["results"] = json!([]);
        let (_, catalog) = run(&case(), &no_results, BindingShape::Legacy);
        assert!(catalog.contains_code("error.trapi.response.message.results.empty"));

        no_results["message"]["results"] = json!({ "r": 1 });
        let (_, catalog) = run(&case(), &no_results, BindingShape::Legacy);
        assert!(catalog.contains_code("error.trapi.response.message.results.not_array"));
    }

    #[test]
    fn binding_shape_follows_the_version() {
        let v = |s: &str| VersionSelector::Released(SemVer::parse(s).unwrap());
        assert_eq!(BindingShape::for_version(&v("1.3.0")), BindingShape::Legacy);
        assert_eq!(BindingShape::for_version(&v("1.4.0-beta")), BindingShape::Analysis);
        assert_eq!(BindingShape::for_version(&v("1.4.2")), BindingShape::Analysis);
        assert_eq!(
            BindingShape::for_version(&VersionSelector::Branch("master".into())),
            BindingShape::Analysis
        );
    }

    #[test]
    fn test_cases_load_with_aliases() {
        let cases = TestCase::list_from_yaml_str(
            "- idx: 3\n  subject: A\n  subject_category: biolink:Gene\n  predicate_id: biolink:affects\n  object: B\n  object_category: biolink:Disease\n",
        )
        .unwrap();
        assert_eq!(cases[0].label(), "3|(A#biolink:Gene)-[biolink:affects]->(B#biolink:Disease)");
    }
}
