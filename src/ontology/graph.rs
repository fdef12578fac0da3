//! Concept graph data structures.
//!
//! The graph is built once by the loader and never mutated afterwards.
//! Profile building consumes it through `label`, `successors` and
//! `predecessors`.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A concept in the ontology: a major, a competency, a course topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptNode {
    pub id: String,
    /// Display label; matched against free-text student input.
    pub label: String,
    /// Free-form tag such as "major" or "skill".
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

impl ConceptNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: String::new(),
            description: String::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Node referenced by an edge but never declared. Its empty label keeps it
    /// out of profile expansion.
    fn placeholder(id: &str) -> Self {
        Self::new(id, "")
    }
}

/// A typed, directed relation between two concepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptEdge {
    pub source_id: String,
    pub target_id: String,
    /// Free-form tag such as "requires" or "part_of".
    pub relation: String,
}

impl ConceptEdge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation: relation.into(),
        }
    }
}

/// The concept ontology: concepts as nodes, relations as edges.
///
/// Uses petgraph for storage and traversal. At most one edge exists per
/// ordered pair; a repeated pair updates the relation.
#[derive(Debug)]
pub struct ConceptGraph {
    graph: DiGraph<ConceptNode, String>,
    /// Fast lookup: node id -> NodeIndex
    index: HashMap<String, NodeIndex>,
}

impl ConceptGraph {
    /// Assemble a graph from parsed nodes and edges.
    ///
    /// A repeated node id replaces the earlier attributes in place. Edge
    /// endpoints that were never declared become placeholder nodes.
    pub fn from_parts(nodes: Vec<ConceptNode>, edges: Vec<ConceptEdge>) -> Self {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut index: HashMap<String, NodeIndex> = HashMap::with_capacity(nodes.len());

        for node in nodes {
            match index.get(&node.id) {
                Some(&idx) => graph[idx] = node,
                None => {
                    let id = node.id.clone();
                    let idx = graph.add_node(node);
                    index.insert(id, idx);
                }
            }
        }

        for edge in edges {
            let src = Self::intern(&mut graph, &mut index, &edge.source_id);
            let dst = Self::intern(&mut graph, &mut index, &edge.target_id);
            graph.update_edge(src, dst, edge.relation);
        }

        Self { graph, index }
    }

    fn intern(
        graph: &mut DiGraph<ConceptNode, String>,
        index: &mut HashMap<String, NodeIndex>,
        id: &str,
    ) -> NodeIndex {
        if let Some(&idx) = index.get(id) {
            return idx;
        }
        let idx = graph.add_node(ConceptNode::placeholder(id));
        index.insert(id.to_string(), idx);
        idx
    }

    pub fn node(&self, id: &str) -> Option<&ConceptNode> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.node(id).map(|n| n.label.as_str())
    }

    /// Ids of concepts this node points to, in edge insertion order.
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.directed_neighbors(id, Direction::Outgoing)
    }

    /// Ids of concepts pointing at this node, in edge insertion order.
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.directed_neighbors(id, Direction::Incoming)
    }

    /// Successors followed by predecessors. A concept linked both ways
    /// appears twice.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let mut all = self.successors(id);
        all.extend(self.predecessors(id));
        all
    }

    fn directed_neighbors(&self, id: &str, dir: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        // petgraph walks adjacency newest-first
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(idx, dir)
            .map(|n| self.graph[n].id.as_str())
            .collect();
        ids.reverse();
        ids
    }

    /// Relation tag on the edge `source -> target`, if any.
    pub fn relation(&self, source: &str, target: &str) -> Option<&str> {
        let src = *self.index.get(source)?;
        let dst = *self.index.get(target)?;
        self.graph
            .find_edge(src, dst)
            .map(|e| self.graph[e].as_str())
    }

    /// All `(id, label)` pairs in load order.
    pub fn all_nodes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph
            .node_weights()
            .map(|n| (n.id.as_str(), n.label.as_str()))
    }

    /// Ids of nodes whose label contains `fragment`, ignoring whitespace on
    /// both sides. Free-text input rarely matches canonical labels exactly.
    pub fn nodes_matching(&self, fragment: &str) -> Vec<&str> {
        let needle = strip_whitespace(fragment);
        if needle.is_empty() {
            return Vec::new();
        }
        self.all_nodes()
            .filter(|(_, label)| strip_whitespace(label).contains(&needle))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConceptGraph {
        ConceptGraph::from_parts(
            vec![
                ConceptNode::new("n1", "Business Administration").with_kind("major"),
                ConceptNode::new("n2", "Marketing"),
                ConceptNode::new("n3", "Consumer Behavior"),
                ConceptNode::new("n4", "Statistics"),
            ],
            vec![
                ConceptEdge::new("n1", "n2", "includes"),
                ConceptEdge::new("n1", "n3", "includes"),
                ConceptEdge::new("n4", "n1", "supports"),
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let g = sample();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.label("n2"), Some("Marketing"));
        assert_eq!(g.node("n1").map(|n| n.kind.as_str()), Some("major"));
        assert_eq!(g.label("missing"), None);
    }

    #[test]
    fn test_successors_and_predecessors_in_insertion_order() {
        let g = sample();
        assert_eq!(g.successors("n1"), vec!["n2", "n3"]);
        assert_eq!(g.predecessors("n1"), vec!["n4"]);
        assert_eq!(g.neighbors("n1"), vec!["n2", "n3", "n4"]);
        assert!(g.successors("missing").is_empty());
    }

    #[test]
    fn test_repeated_edge_updates_relation() {
        let g = ConceptGraph::from_parts(
            vec![ConceptNode::new("a", "A"), ConceptNode::new("b", "B")],
            vec![ConceptEdge::new("a", "b", "old"), ConceptEdge::new("a", "b", "new")],
        );
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.relation("a", "b"), Some("new"));
        assert_eq!(g.relation("b", "a"), None);
    }

    #[test]
    fn test_undeclared_endpoint_becomes_unlabeled_node() {
        let g = ConceptGraph::from_parts(
            vec![ConceptNode::new("a", "A")],
            vec![ConceptEdge::new("a", "ghost", "links")],
        );
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.label("ghost"), Some(""));
        assert_eq!(g.successors("a"), vec!["ghost"]);
    }

    #[test]
    fn test_duplicate_node_id_replaces_attributes() {
        let g = ConceptGraph::from_parts(
            vec![ConceptNode::new("a", "First"), ConceptNode::new("a", "Second")],
            vec![],
        );
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.label("a"), Some("Second"));
    }

    #[test]
    fn test_nodes_matching_ignores_whitespace() {
        let g = sample();
        assert_eq!(g.nodes_matching("BusinessAdministration"), vec!["n1"]);
        assert_eq!(g.nodes_matching("Business"), vec!["n1"]);
        assert_eq!(g.nodes_matching("Consumer  Behavior"), vec!["n3"]);
        assert!(g.nodes_matching("Physics").is_empty());
        assert!(g.nodes_matching("  ").is_empty());
    }

    #[test]
    fn test_bidirectional_link_listed_twice() {
        let g = ConceptGraph::from_parts(
            vec![ConceptNode::new("a", "A"), ConceptNode::new("b", "B")],
            vec![ConceptEdge::new("a", "b", "x"), ConceptEdge::new("b", "a", "y")],
        );
        assert_eq!(g.neighbors("a"), vec!["b", "b"]);
    }
}
