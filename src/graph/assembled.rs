//! AssembledGraph: the deduplicated union of all graph documents of one generation

use super::assembler::MergePolicy;
use super::document::GraphDocument;
use super::edge::{Edge, EdgeKey};
use super::node::{Node, NodeId, Properties};
use std::collections::{BTreeSet, HashMap};

/// Outcome of merging one node into the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeMerge {
    Inserted,
    Merged { type_conflict: bool },
}

/// Deduplicated graph with stable insertion order.
///
/// Nodes are unique by id, edges unique by `(source, target, relationship)`.
/// Every edge's endpoints are present in the node set; only the assembler
/// constructs non-empty graphs, and it synthesizes missing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledGraph {
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<EdgeKey, usize>,
}

impl AssembledGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn get_edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edge_index.get(key).map(|&i| &self.edges[i])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Nodes typed `Unknown`, i.e. synthesized for dangling edges.
    pub fn placeholder_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_placeholder()).count()
    }

    /// `(id, type)` pairs of all nodes, independent of insertion order.
    pub fn node_signature(&self) -> BTreeSet<(String, String)> {
        self.nodes
            .iter()
            .map(|n| (n.id.to_string(), n.node_type.clone()))
            .collect()
    }

    /// `(source, target, relationship)` triples of all edges.
    pub fn edge_triples(&self) -> BTreeSet<EdgeKey> {
        self.edges.iter().map(Edge::key).collect()
    }

    /// True when both graphs have the same node ids/types and edge triples.
    pub fn same_structure(&self, other: &AssembledGraph) -> bool {
        self.node_signature() == other.node_signature()
            && self.edge_triples() == other.edge_triples()
    }

    /// Edges whose endpoints are missing from the node set.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| !self.contains_node(&e.source) || !self.contains_node(&e.target))
            .collect()
    }

    /// Flatten back into a single graph document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.clone(),
            relationships: self.edges.clone(),
        }
    }

    pub(crate) fn merge_node(&mut self, node: Node, policy: MergePolicy) -> NodeMerge {
        match self.node_index.get(&node.id) {
            Some(&i) => {
                let existing = &mut self.nodes[i];
                let type_conflict = existing.node_type != node.node_type;
                if type_conflict && policy == MergePolicy::LastWrite {
                    existing.node_type = node.node_type;
                }
                merge_properties(&mut existing.properties, node.properties, policy);
                NodeMerge::Merged { type_conflict }
            }
            None => {
                self.node_index.insert(node.id.clone(), self.nodes.len());
                self.nodes.push(node);
                NodeMerge::Inserted
            }
        }
    }

    /// Returns true when the edge was new.
    pub(crate) fn merge_edge(&mut self, edge: Edge, policy: MergePolicy) -> bool {
        let key = edge.key();
        match self.edge_index.get(&key) {
            Some(&i) => {
                merge_properties(&mut self.edges[i].properties, edge.properties, policy);
                false
            }
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(edge);
                true
            }
        }
    }
}

/// Union of two property maps; colliding keys follow the merge policy.
fn merge_properties(existing: &mut Properties, incoming: Properties, policy: MergePolicy) {
    for (k, v) in incoming {
        match policy {
            MergePolicy::FirstSeen => {
                existing.entry(k).or_insert(v);
            }
            MergePolicy::LastWrite => {
                existing.insert(k, v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_node_keeps_insertion_order() {
        let mut g = AssembledGraph::new();
        g.merge_node(Node::new("B", "Person"), MergePolicy::FirstSeen);
        g.merge_node(Node::new("A", "Person"), MergePolicy::FirstSeen);
        let ids: Vec<_> = g.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn first_seen_keeps_existing_type_and_values() {
        let mut g = AssembledGraph::new();
        g.merge_node(Node::new("A", "Person").with_property("age", "30"), MergePolicy::FirstSeen);
        let outcome = g.merge_node(
            Node::new("A", "Company")
                .with_property("age", "31")
                .with_property("city", "Paris"),
            MergePolicy::FirstSeen,
        );

        assert_eq!(outcome, NodeMerge::Merged { type_conflict: true });
        let a = g.get_node(&NodeId::from("A")).unwrap();
        assert_eq!(a.node_type, "Person");
        assert_eq!(a.properties.get("age").map(String::as_str), Some("30"));
        assert_eq!(a.properties.get("city").map(String::as_str), Some("Paris"));
    }

    #[test]
    fn last_write_overwrites_type_and_values() {
        let mut g = AssembledGraph::new();
        g.merge_node(Node::new("A", "Person").with_property("age", "30"), MergePolicy::LastWrite);
        g.merge_node(Node::new("A", "Company").with_property("age", "31"), MergePolicy::LastWrite);

        let a = g.get_node(&NodeId::from("A")).unwrap();
        assert_eq!(a.node_type, "Company");
        assert_eq!(a.properties.get("age").map(String::as_str), Some("31"));
    }

    #[test]
    fn duplicate_edge_collapses_and_unions_properties() {
        let mut g = AssembledGraph::new();
        assert!(g.merge_edge(Edge::new("A", "B", "KNOWS").with_property("since", "1990"), MergePolicy::FirstSeen));
        assert!(!g.merge_edge(Edge::new("A", "B", "KNOWS").with_property("where", "Oslo"), MergePolicy::FirstSeen));

        assert_eq!(g.edge_count(), 1);
        let e = g.get_edge(&Edge::new("A", "B", "KNOWS").key()).unwrap();
        assert_eq!(e.properties.len(), 2);
    }

    #[test]
    fn dangling_edges_are_reported() {
        let mut g = AssembledGraph::new();
        g.merge_node(Node::new("A", "Person"), MergePolicy::FirstSeen);
        g.merge_edge(Edge::new("A", "B", "KNOWS"), MergePolicy::FirstSeen);
        assert_eq!(g.dangling_edges().len(), 1);
    }
}
