//! # Graph Compliance
//!
//! Shape and ontology checks over a query graph or a (sampled) knowledge
//! graph. Shape checks always run. Category and predicate membership checks
//! run only when an [`Ontology`] is supplied.
//!
//! Knowledge graph edges of TRAPI 1.4.0-beta and later (and of unversioned
//! branches or schema files) must carry `sources`. The retrieval sources
//! of an edge also give the source trail attached to its messages:
//! primary knowledge source first, then every other source, joined by
//! `" -> "`. Retrieval source resources must be `infores:` CURIEs; a
//! source naming anything else is reported and left out of the trail.
//!
//! Edge attributes, qualifiers and their query graph constraints get shape
//! checks. Before TRAPI 1.4.0-beta, provenance lives in knowledge source
//! attributes, so their values are held to the same `infores:` rule.

use serde_json::{Map, Value};
use trapi_core::{Message, MessageCatalog};
use trapi_schema::version::trapi_1_4_0_beta;
use trapi_schema::VersionSelector;

use crate::collaborators::Ontology;

/// Retrieval source role marking where an edge assertion originates.
pub const PRIMARY_KNOWLEDGE_SOURCE: &str = "primary_knowledge_source";

/// Attribute types recording knowledge source provenance before TRAPI 1.4.0-beta.
const KNOWLEDGE_SOURCE_ATTRIBUTES: [&str; 3] = [
    "biolink:aggregator_knowledge_source",
    "biolink:primary_knowledge_source",
    "biolink:original_knowledge_source",
];

/// Attribute values that stand for "no value".
const PLACEHOLDER_VALUES: [&str; 3] = ["N/A", "NONE", "NULL"];

/// Which TRAPI graph is being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKind {
    /// `message.query_graph`
    QueryGraph,
    /// `message.knowledge_graph`
    KnowledgeGraph,
}

impl GraphKind {
    /// Key of the graph in a TRAPI message.
    pub fn context(&self) -> &'static str {
        match self {
            Self::QueryGraph => "query_graph",
            Self::KnowledgeGraph => "knowledge_graph",
        }
    }

    /// Human readable name, used as message identifier.
    pub fn label(&self) -> &'static str {
        match self {
            Self::QueryGraph => "Query Graph",
            Self::KnowledgeGraph => "Knowledge Graph",
        }
    }
}

/// Compliance checker for one graph at one TRAPI version.
pub struct GraphChecker<'a> {
    ontology: Option<&'a dyn Ontology>,
    version: &'a VersionSelector,
}

impl<'a> GraphChecker<'a> {
    /// A checker. Without an ontology only shape checks run.
    pub fn new(ontology: Option<&'a dyn Ontology>, version: &'a VersionSelector) -> Self {
        Self { ontology, version }
    }

    fn requires_sources(&self) -> bool {
        self.version.is_at_least(&trapi_1_4_0_beta()).unwrap_or(true)
    }

    /// Check `graph` and report findings into `catalog`.
    pub fn check(&self, graph: &Value, kind: GraphKind, catalog: &mut MessageCatalog) {
        let empty = Map::new();
        let nodes = graph.get("nodes").and_then(Value::as_object).unwrap_or(&empty);
        let edges = graph.get("edges").and_then(Value::as_object).unwrap_or(&empty);

        if nodes.is_empty() && edges.is_empty() {
            catalog.report("warning.graph.empty", Message::identified(kind.label()));
            return;
        }

        match kind {
            GraphKind::KnowledgeGraph => {
                if nodes.is_empty() {
                    catalog.report("error.knowledge_graph.nodes.empty", Message::new());
                }
                if edges.is_empty() {
                    catalog.report("error.knowledge_graph.edges.empty", Message::new());
                }
                for (node_id, node) in nodes {
                    self.check_kg_node(node_id, node, catalog);
                }
                for (edge_id, edge) in edges {
                    self.check_kg_edge(edge_id, edge, nodes, catalog);
                }
            }
            GraphKind::QueryGraph => {
                for (node_id, node) in nodes {
                    self.check_qg_node(node_id, node, catalog);
                }
                for (edge_id, edge) in edges {
                    self.check_qg_edge(edge_id, edge, nodes, catalog);
                }
            }
        }

        tracing::debug!(
            graph = kind.context(),
            nodes = nodes.len(),
            edges = edges.len(),
            ontology = self.ontology.is_some(),
            "graph compliance checked"
        );
    }

    // ─── Nodes ──────────────────────────────────────────────────────

    fn check_kg_node(&self, node_id: &str, node: &Value, catalog: &mut MessageCatalog) {
        match node.get("categories") {
            None | Some(Value::Null) => catalog.report(
                "error.knowledge_graph.node.category.missing",
                Message::identified(node_id),
            ),
            Some(Value::Array(categories)) => {
                if categories.is_empty() {
                    catalog.report(
                        "error.knowledge_graph.node.category.missing",
                        Message::identified(node_id),
                    );
                }
                self.check_categories(
                    categories,
                    node_id,
                    "error.knowledge_graph.node.category.unknown",
                    catalog,
                );
            }
            Some(_) => catalog.report(
                "error.knowledge_graph.node.categories.not_array",
                Message::identified(node_id),
            ),
        }
    }

    fn check_qg_node(&self, node_id: &str, node: &Value, catalog: &mut MessageCatalog) {
        match node.get("ids") {
            None | Some(Value::Null) | Some(Value::Array(_)) => {}
            Some(_) => catalog.report(
                "error.query_graph.node.ids.not_array",
                Message::identified(node_id),
            ),
        }

        match node.get("categories") {
            None | Some(Value::Null) => {}
            Some(Value::Array(categories)) => self.check_categories(
                categories,
                node_id,
                "error.query_graph.node.category.unknown",
                catalog,
            ),
            Some(_) => catalog.report(
                "error.query_graph.node.categories.not_array",
                Message::identified(node_id),
            ),
        }

        match node.get("is_set") {
            None | Some(Value::Null) | Some(Value::Bool(_)) => {}
            Some(_) => catalog.report(
                "error.query_graph.node.is_set.not_boolean",
                Message::identified(node_id),
            ),
        }
    }

    fn check_categories(
        &self,
        categories: &[Value],
        node_id: &str,
        unknown_code: &str,
        catalog: &mut MessageCatalog,
    ) {
        let Some(ontology) = self.ontology else {
            return;
        };
        for category in categories {
            let category = category
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| category.to_string());
            if !ontology.is_known(&category) {
                catalog.report(
                    unknown_code,
                    Message::identified(category).param("node_id", node_id),
                );
            }
        }
    }

    // ─── Edges ──────────────────────────────────────────────────────

    fn check_kg_edge(
        &self,
        edge_id: &str,
        edge: &Value,
        nodes: &Map<String, Value>,
        catalog: &mut MessageCatalog,
    ) {
        let label = edge_label(edge);
        let trail = if self.requires_sources() {
            self.check_sources(edge, &label, catalog)
        } else {
            None
        };
        let trail = trail.as_deref();

        if let Some(qualifiers) = edge.get("qualifiers") {
            if !qualifiers.is_null() && !qualifiers.is_array() {
                catalog.report(
                    "error.knowledge_graph.edge.qualifiers.not_array",
                    Message::identified(label.as_str()).maybe_source_trail(trail),
                );
            }
        }
        self.check_attributes(edge, &label, trail, catalog);

        for (role, missing, missing_from_nodes) in [
            (
                "subject",
                "error.knowledge_graph.edge.subject.missing",
                "error.knowledge_graph.edge.subject.missing_from_nodes",
            ),
            (
                "object",
                "error.knowledge_graph.edge.object.missing",
                "error.knowledge_graph.edge.object.missing_from_nodes",
            ),
        ] {
            match edge.get(role).and_then(Value::as_str) {
                None => catalog.report(
                    missing,
                    Message::identified(label.as_str()).maybe_source_trail(trail),
                ),
                Some(node_id) if !nodes.contains_key(node_id) => catalog.report(
                    missing_from_nodes,
                    Message::identified(node_id)
                        .param("edge_id", edge_id)
                        .maybe_source_trail(trail),
                ),
                Some(_) => {}
            }
        }

        match edge.get("predicate").and_then(Value::as_str) {
            None => catalog.report(
                "error.knowledge_graph.edge.predicate.missing",
                Message::identified(label.as_str()).maybe_source_trail(trail),
            ),
            Some(predicate) => {
                if let Some(ontology) = self.ontology {
                    if !ontology.is_known(predicate) {
                        catalog.report(
                            "error.knowledge_graph.edge.predicate.unknown",
                            Message::identified(predicate)
                                .param("edge_id", edge_id)
                                .maybe_source_trail(trail),
                        );
                    }
                }
            }
        }
    }

    /// Check the retrieval sources of a knowledge graph edge and return its
    /// source trail, if any can be derived.
    fn check_sources(&self, edge: &Value, label: &str, catalog: &mut MessageCatalog) -> Option<String> {
        let sources = match edge.get("sources") {
            None | Some(Value::Null) => {
                catalog.report(
                    "error.knowledge_graph.edge.sources.missing",
                    Message::identified(label),
                );
                return None;
            }
            Some(Value::Array(sources)) if sources.is_empty() => {
                catalog.report(
                    "error.knowledge_graph.edge.sources.empty",
                    Message::identified(label),
                );
                return None;
            }
            Some(Value::Array(sources)) => sources,
            Some(_) => {
                catalog.report(
                    "error.knowledge_graph.edge.sources.not_array",
                    Message::identified(label),
                );
                return None;
            }
        };

        let mut primary: Vec<&str> = Vec::new();
        let mut others: Vec<&str> = Vec::new();
        for source in sources {
            let resource_id = non_empty_str(source.get("resource_id"));
            let resource_role = non_empty_str(source.get("resource_role"));
            if resource_id.is_none() {
                catalog.report(
                    "error.knowledge_graph.edge.sources.retrieval_source.resource_id.empty",
                    Message::identified(label),
                );
            }
            if resource_role.is_none() {
                catalog.report(
                    "error.knowledge_graph.edge.sources.retrieval_source.resource_role.empty",
                    Message::identified(label),
                );
            }
            let Some(resource_id) = resource_id else {
                continue;
            };
            if let Some(Value::Array(upstream)) = source.get("upstream_resource_ids") {
                for upstream_id in upstream.iter().filter_map(Value::as_str) {
                    check_infores("upstream_resource_ids", upstream_id, label, catalog);
                }
            }
            if !check_infores("resource_id", resource_id, label, catalog) {
                continue;
            }
            if resource_role == Some(PRIMARY_KNOWLEDGE_SOURCE) {
                primary.push(resource_id);
            } else {
                others.push(resource_id);
            }
        }

        match primary.len() {
            0 => catalog.report(
                "error.knowledge_graph.edge.provenance.missing_primary",
                Message::identified(label),
            ),
            1 => {}
            _ => catalog.report(
                "warning.knowledge_graph.edge.provenance.multiple_primary",
                Message::identified(label).param("sources", primary.join(",")),
            ),
        }

        let trail: Vec<&str> = primary.into_iter().chain(others).collect();
        (!trail.is_empty()).then(|| trail.join(" -> "))
    }

    /// Shape of the edge `attributes`. Their absence only matters before
    /// TRAPI 1.4.0-beta, and only for ontology-checked graphs.
    fn check_attributes(&self, edge: &Value, label: &str, trail: Option<&str>, catalog: &mut MessageCatalog) {
        let provenance_in_attributes = !self.requires_sources();
        let report_absence = |catalog: &mut MessageCatalog, code: &str| {
            if provenance_in_attributes && self.ontology.is_some() {
                catalog.report(code, Message::identified(label).maybe_source_trail(trail));
            }
        };
        let attributes = match edge.get("attributes") {
            None => return report_absence(catalog, "error.knowledge_graph.edge.attribute.missing"),
            Some(Value::Null) => return report_absence(catalog, "error.knowledge_graph.edge.attribute.empty"),
            Some(Value::Array(attributes)) if attributes.is_empty() => {
                return report_absence(catalog, "error.knowledge_graph.edge.attribute.empty")
            }
            Some(Value::Array(attributes)) => attributes,
            Some(_) => {
                catalog.report(
                    "error.knowledge_graph.edge.attribute.not_array",
                    Message::identified(label).maybe_source_trail(trail),
                );
                return;
            }
        };

        for attribute in attributes {
            let problem = match (attribute.get("attribute_type_id"), attribute.get("value")) {
                (None, _) => Some("error.knowledge_graph.edge.attribute.type_id.missing"),
                (Some(type_id), _) if is_empty_value(type_id) => {
                    Some("error.knowledge_graph.edge.attribute.type_id.empty")
                }
                (_, None) => Some("error.knowledge_graph.edge.attribute.value.missing"),
                (_, Some(value)) if is_empty_value(value) || is_placeholder(value) => {
                    Some("error.knowledge_graph.edge.attribute.value.empty")
                }
                _ => None,
            };
            if let Some(code) = problem {
                catalog.report(code, Message::identified(label).maybe_source_trail(trail));
                continue;
            }

            let type_id = attribute.get("attribute_type_id").map(display_value).unwrap_or_default();
            if !is_curie(&type_id) {
                catalog.report(
                    "error.knowledge_graph.edge.attribute.type_id.not_curie",
                    Message::identified(type_id)
                        .param("edge_id", label)
                        .maybe_source_trail(trail),
                );
                continue;
            }

            if provenance_in_attributes && KNOWLEDGE_SOURCE_ATTRIBUTES.contains(&type_id.as_str()) {
                let values = match attribute.get("value") {
                    Some(Value::Array(items)) => items.iter().collect(),
                    other => other.into_iter().collect::<Vec<_>>(),
                };
                for infores in values.into_iter().map(display_value) {
                    if !infores.starts_with("infores:") {
                        catalog.report(
                            "error.knowledge_graph.edge.provenance.infores.missing",
                            Message::identified(infores)
                                .param("edge_id", label)
                                .maybe_source_trail(trail),
                        );
                    }
                }
            }
        }
    }

    fn check_qg_edge(
        &self,
        edge_id: &str,
        edge: &Value,
        nodes: &Map<String, Value>,
        catalog: &mut MessageCatalog,
    ) {
        let label = edge_label(edge);
        for (role, missing, missing_from_nodes) in [
            (
                "subject",
                "error.query_graph.edge.subject.missing",
                "error.query_graph.edge.subject.missing_from_nodes",
            ),
            (
                "object",
                "error.query_graph.edge.object.missing",
                "error.query_graph.edge.object.missing_from_nodes",
            ),
        ] {
            match edge.get(role).and_then(Value::as_str) {
                None => catalog.report(missing, Message::identified(label.as_str())),
                Some(node_id) if !nodes.contains_key(node_id) => catalog.report(
                    missing_from_nodes,
                    Message::identified(node_id).param("edge_id", edge_id),
                ),
                Some(_) => {}
            }
        }

        if let Some(constraints) = edge.get("attribute_constraints") {
            if !constraints.is_null() && !constraints.is_array() {
                catalog.report(
                    "error.query_graph.edge.attribute_constraints.not_array",
                    Message::identified(label.as_str()),
                );
            }
        }
        if let Some(Value::Array(constraints)) = edge.get("qualifier_constraints") {
            for constraint in constraints {
                if constraint.get("qualifier_set").map_or(true, is_empty_value) {
                    catalog.report(
                        "error.query_graph.edge.qualifier_constraints.qualifier_set.empty",
                        Message::identified(label.as_str()),
                    );
                }
            }
        }

        match edge.get("predicates") {
            None | Some(Value::Null) => {}
            Some(Value::Array(predicates)) if predicates.is_empty() => catalog.report(
                "error.query_graph.edge.predicate.empty_array",
                Message::identified(label.as_str()),
            ),
            Some(Value::Array(predicates)) => {
                let Some(ontology) = self.ontology else {
                    return;
                };
                for predicate in predicates.iter().filter_map(Value::as_str) {
                    if !ontology.is_known(predicate) {
                        catalog.report(
                            "error.query_graph.edge.predicate.unknown",
                            Message::identified(predicate).param("edge_id", edge_id),
                        );
                    }
                }
            }
            Some(_) => catalog.report(
                "error.query_graph.edge.predicate.not_array",
                Message::identified(label.as_str()),
            ),
        }
    }
}

/// `"<subject>--<predicate>-><object>"`, used to identify edge messages.
/// Query edges show their `predicates` list.
pub fn edge_label(edge: &Value) -> String {
    let part = |key: &str| match edge.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
            .collect::<Vec<_>>()
            .join(","),
        Some(other) => other.to_string(),
    };
    let predicate = if edge.get("predicate").is_some() {
        part("predicate")
    } else {
        part("predicates")
    };
    format!("{}--{}->{}", part("subject"), predicate, part("object"))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// `prefix:reference`, with a non-empty prefix and reference and no
/// whitespace.
pub fn is_curie(text: &str) -> bool {
    match text.split_once(':') {
        Some((prefix, reference)) => {
            !prefix.is_empty()
                && !reference.is_empty()
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
                && !reference.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Check one retrieval source resource. Reports and returns `false` unless
/// it is an `infores:` CURIE.
fn check_infores(context: &str, identifier: &str, label: &str, catalog: &mut MessageCatalog) -> bool {
    let problem = if !is_curie(identifier) {
        "not_curie"
    } else if !identifier.starts_with("infores:") {
        "invalid"
    } else {
        return true;
    };
    catalog.report(
        &format!("error.knowledge_graph.edge.sources.retrieval_source.{context}.infores.{problem}"),
        Message::identified(identifier).param("edge_id", label),
    );
    false
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn is_placeholder(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| PLACEHOLDER_VALUES.contains(&s.trim().to_uppercase().as_str()))
}

fn display_value(value: &Value) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}
