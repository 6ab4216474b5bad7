//! Bounded, deterministic samples of knowledge graphs and results.
//!
//! Responses can carry very large knowledge graphs. Structural and
//! compliance checks run on a sample: the first `E` edges in source order
//! plus the nodes they reference. An endpoint missing from the source
//! nodes is skipped silently here; the mapping check reports it.

use serde_json::{Map, Value};

/// Subgraph of a knowledge graph, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSample {
    /// Sampled nodes, by id.
    pub nodes: Map<String, Value>,
    /// Sampled edges, by id.
    pub edges: Map<String, Value>,
}

impl GraphSample {
    /// Sample `graph` keeping at most `edge_cap` edges (0 = all edges and
    /// all nodes).
    pub fn from_graph(graph: &Value, edge_cap: usize) -> Self {
        let empty = Map::new();
        let source_nodes = graph.get("nodes").and_then(Value::as_object).unwrap_or(&empty);
        let source_edges = graph.get("edges").and_then(Value::as_object).unwrap_or(&empty);

        if edge_cap == 0 {
            return Self {
                nodes: source_nodes.clone(),
                edges: source_edges.clone(),
            };
        }

        let mut sample = Self::default();
        for (edge_id, edge) in source_edges.iter().take(edge_cap) {
            sample.edges.insert(edge_id.clone(), edge.clone());
            for role in ["subject", "object"] {
                let Some(node_id) = edge.get(role).and_then(Value::as_str) else {
                    continue;
                };
                if sample.nodes.contains_key(node_id) {
                    continue;
                }
                if let Some(node) = source_nodes.get(node_id) {
                    sample.nodes.insert(node_id.to_string(), node.clone());
                }
            }
        }
        tracing::debug!(
            edges = sample.edges.len(),
            of_edges = source_edges.len(),
            nodes = sample.nodes.len(),
            "sampled knowledge graph"
        );
        sample
    }

    /// The sample as a `KnowledgeGraph` document.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "nodes": Value::Object(self.nodes.clone()),
            "edges": Value::Object(self.edges.clone()),
        })
    }
}

/// The first `cap` results (0 = all).
pub fn sample_results(results: &[Value], cap: usize) -> &[Value] {
    if cap == 0 {
        results
    } else {
        &results[..cap.min(results.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn five_edge_graph() -> Value {
        json!({
            "nodes": {
                "A": { "categories": ["X"] }, "B": {}, "C": {}, "D": {}, "E": {}, "F": {}
            },
            "edges": {
                "e0": { "subject": "A", "predicate": "p", "object": "B" },
                "e1": { "subject": "B", "predicate": "p", "object": "MISSING" },
                "e2": { "subject": "C", "predicate": "p", "object": "D" },
                "e3": { "subject": "D", "predicate": "p", "object": "E" },
                "e4": { "subject": "E", "predicate": "p", "object": "F" }
            }
        })
    }

    #[test]
    fn cap_takes_first_edges_and_their_nodes() {
        let sample = GraphSample::from_graph(&five_edge_graph(), 2);
        let edges: Vec<&str> = sample.edges.keys().map(String::as_str).collect();
        assert_eq!(edges, vec!["e0", "e1"]);
        let nodes: Vec<&str> = sample.nodes.keys().map(String::as_str).collect();
        assert_eq!(nodes, vec!["A", "B"]);
        assert_eq!(sample.nodes["A"], json!({ "categories": ["X"] }));
    }

    #[test]
    fn zero_cap_keeps_everything() {
        let graph = five_edge_graph();
        let sample = GraphSample::from_graph(&graph, 0);
        assert_eq!(sample.to_value(), graph);
    }

    #[test]
    fn cap_larger_than_graph_takes_all_edges() {
        let sample = GraphSample::from_graph(&five_edge_graph(), 50);
        assert_eq!(sample.edges.len(), 5);
        assert_eq!(sample.nodes.len(), 6);
    }

    #[test]
    fn results_are_truncated_in_order() {
        let results = vec![json!(1), json!(2), json!(3)];
        assert_eq!(sample_results(&results, 2), &[json!(1), json!(2)]);
        assert_eq!(sample_results(&results, 0).len(), 3);
        assert_eq!(sample_results(&results, 9).len(), 3);
    }
}
