//! # Collaborators
//!
//! The semantic knowledge the validator consumes but does not own:
//!
//! - [`Ontology`]: category and predicate hierarchy, predicate inverses and
//!   parent concepts of identifiers.
//! - [`IdentityResolver`]: equivalent identifiers of a CURIE.
//! - [`MappingChecker`]: consistency of knowledge graph nodes and edges.
//!
//! Each trait has an in-memory implementation here. [`StaticOntology`] and
//! [`StaticAliases`] are loaded from YAML; hosted model toolkits and node
//! normalization services plug in behind the same traits.

use std::collections::HashSet;
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trapi_core::{Message, MessageCatalog};

use crate::error::{load_yaml_file, LoadError};

// ─── Traits ─────────────────────────────────────────────────────────

/// Category and predicate hierarchy.
///
/// Closures include the term itself. Unknown terms have empty closures.
pub trait Ontology {
    /// The term and every broader term.
    fn ancestors(&self, term: &str) -> Vec<String>;

    /// The term and every narrower term.
    fn descendants(&self, term: &str) -> Vec<String>;

    /// Registered inverse of a predicate.
    fn inverse(&self, predicate: &str) -> Option<String>;

    /// Broader concept of an identifier within a category.
    fn parent_concept(&self, id: &str, category: &str) -> Option<String>;

    /// Whether the term belongs to the ontology.
    fn is_known(&self, term: &str) -> bool {
        !self.ancestors(term).is_empty()
    }
}

/// Equivalent identifiers of a CURIE.
pub trait IdentityResolver {
    /// The identifier and all its aliases, the identifier first.
    fn aliases(&self, id: &str) -> Vec<String>;
}

/// Consistency checks over a whole knowledge graph.
pub trait MappingChecker {
    /// Check `knowledge_graph`, reporting into a catalog spawned from
    /// `template` (same registry and defaults).
    fn check(&self, knowledge_graph: &Value, template: &MessageCatalog) -> MessageCatalog;
}

// ─── StaticOntology ─────────────────────────────────────────────────

/// In-memory [`Ontology`].
///
/// ```yaml
/// terms:
///   biolink:NamedThing: []
///   biolink:Gene: [biolink:NamedThing]
///   biolink:related_to: []
///   biolink:treats: [biolink:related_to]
/// inverses:
///   biolink:treats: biolink:treated_by
/// parent_concepts:
///   MONDO:0005148: MONDO:0005015
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticOntology {
    /// term -> direct parents
    terms: IndexMap<String, Vec<String>>,
    /// predicate -> inverse predicate (registered in both directions)
    inverses: IndexMap<String, String>,
    /// identifier -> broader identifier
    parent_concepts: IndexMap<String, String>,
}

impl StaticOntology {
    /// An empty ontology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a term with its direct parents. Parents are registered
    /// as terms too.
    pub fn with_term(mut self, term: &str, parents: &[&str]) -> Self {
        for parent in parents {
            self.terms.entry(parent.to_string()).or_default();
        }
        let entry = self.terms.entry(term.to_string()).or_default();
        entry.extend(parents.iter().map(|p| p.to_string()));
        self
    }

    /// Register a pair of inverse predicates.
    pub fn with_inverse(mut self, predicate: &str, inverse: &str) -> Self {
        self.inverses.insert(predicate.to_string(), inverse.to_string());
        self
    }

    /// Register the parent concept of an identifier.
    pub fn with_parent_concept(mut self, id: &str, parent: &str) -> Self {
        self.parent_concepts.insert(id.to_string(), parent.to_string());
        self
    }

    /// Parse a YAML ontology document.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed documents.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(text).map_err(|source| LoadError::Parse {
            what: "ontology",
            source,
        })
    }

    /// Load a YAML ontology file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] or [`LoadError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        load_yaml_file(path, "ontology")
    }

    fn closure<'a, F, I>(&'a self, term: &str, next: F) -> Vec<String>
    where
        F: Fn(&'a str) -> I,
        I: Iterator<Item = &'a str>,
    {
        let Some((start, _)) = self.terms.get_key_value(term) else {
            return Vec::new();
        };
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut pending: Vec<&str> = vec![start.as_str()];
        while let Some(current) = pending.pop() {
            if seen.insert(current) {
                pending.extend(next(current));
            }
        }
        seen.into_iter().map(str::to_string).collect()
    }
}

impl Ontology for StaticOntology {
    fn ancestors(&self, term: &str) -> Vec<String> {
        self.closure(term, |t| {
            self.terms
                .get(t)
                .into_iter()
                .flat_map(|parents| parents.iter().map(String::as_str))
        })
    }

    fn descendants(&self, term: &str) -> Vec<String> {
        self.closure(term, |t| {
            self.terms
                .iter()
                .filter(move |(_, parents)| parents.iter().any(|p| p == t))
                .map(|(child, _)| child.as_str())
        })
    }

    fn inverse(&self, predicate: &str) -> Option<String> {
        self.inverses.get(predicate).cloned().or_else(|| {
            self.inverses
                .iter()
                .find(|(_, inverse)| inverse.as_str() == predicate)
                .map(|(forward, _)| forward.clone())
        })
    }

    fn parent_concept(&self, id: &str, _category: &str) -> Option<String> {
        self.parent_concepts.get(id).cloned()
    }
}

// ─── StaticAliases ──────────────────────────────────────────────────

/// In-memory [`IdentityResolver`] over groups of equivalent identifiers.
/// Identifiers in no group are their own only alias.
///
/// ```yaml
/// - [MONDO:0005148, DOID:9352, UMLS:C0011860]
/// - [CHEBI:6801, PUBCHEM.COMPOUND:4091]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticAliases {
    groups: Vec<Vec<String>>,
}

impl StaticAliases {
    /// No aliases at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group of equivalent identifiers.
    pub fn with_group(mut self, ids: &[&str]) -> Self {
        self.groups.push(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Parse a YAML list of alias groups.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Parse`] for malformed documents.
    pub fn from_yaml_str(text: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(text).map_err(|source| LoadError::Parse {
            what: "alias groups",
            source,
        })
    }

    /// Load a YAML alias file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] or [`LoadError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        load_yaml_file(path, "alias groups")
    }
}

impl IdentityResolver for StaticAliases {
    fn aliases(&self, id: &str) -> Vec<String> {
        let mut aliases = vec![id.to_string()];
        for group in self.groups.iter().filter(|g| g.iter().any(|m| m == id)) {
            for member in group {
                if !aliases.contains(member) {
                    aliases.push(member.clone());
                }
            }
        }
        aliases
    }
}

// ─── NodeEdgeMappingChecker ─────────────────────────────────────────

/// Checks that every edge endpoint is a node of the graph and that every
/// node is an endpoint of some edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeEdgeMappingChecker;

impl MappingChecker for NodeEdgeMappingChecker {
    fn check(&self, knowledge_graph: &Value, template: &MessageCatalog) -> MessageCatalog {
        let mut catalog = template.spawn();
        let empty = serde_json::Map::new();
        let nodes = knowledge_graph
            .get("nodes")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let edges = knowledge_graph
            .get("edges")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let mut referenced: HashSet<&str> = HashSet::new();
        for (edge_id, edge) in edges {
            for role in ["subject", "object"] {
                let Some(node_id) = edge.get(role).and_then(Value::as_str) else {
                    continue;
                };
                referenced.insert(node_id);
                if !nodes.contains_key(node_id) {
                    catalog.report(
                        "error.knowledge_graph.edge.dangling_reference",
                        Message::identified(node_id)
                            .param("edge_id", edge_id.as_str())
                            .param("role", role),
                    );
                }
            }
        }

        for node_id in nodes.keys() {
            if !referenced.contains(node_id.as_str()) {
                catalog.report(
                    "warning.knowledge_graph.node.unused",
                    Message::identified(node_id.as_str()),
                );
            }
        }

        if catalog.has_messages() {
            tracing::debug!(
                edges = edges.len(),
                nodes = nodes.len(),
                "knowledge graph node/edge mapping inconsistencies"
            );
        }
        catalog
    }
}
