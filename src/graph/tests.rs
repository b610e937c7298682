//! Assembly scenarios: dedup, dangling edges, merge order

use super::*;
use serde_json::json;

fn people_doc() -> GraphDocument {
    GraphDocument::new()
        .with_node(Node::new("Alice", "Person").with_property("role", "engineer"))
        .with_node(Node::new("Acme", "Organization"))
        .with_relationship(Edge::new("Alice", "Acme", "WORKS_AT"))
}

fn places_doc() -> GraphDocument {
    GraphDocument::new()
        .with_node(Node::new("Acme", "Organization").with_property("founded", "1999"))
        .with_node(Node::new("Berlin", "City"))
        .with_relationship(Edge::new("Acme", "Berlin", "LOCATED_IN"))
}

// --- Scenario: the reference example from the pipeline contract ---

#[test]
fn dangling_target_becomes_unknown_node() {
    let doc = GraphDocument::from_value(&json!({
        "nodes": [{ "id": "A", "type": "Person" }],
        "relationships": [{ "source_id": "A", "target_id": "B", "relation_type": "KNOWS" }]
    }))
    .unwrap();

    let graph = GraphAssembler::new().assemble(&[doc]).unwrap();

    let expected_nodes = [
        ("A".to_string(), "Person".to_string()),
        ("B".to_string(), UNKNOWN_NODE_TYPE.to_string()),
    ];
    assert_eq!(graph.node_signature(), expected_nodes.into_iter().collect());
    assert_eq!(
        graph.edge_triples(),
        [Edge::new("A", "B", "KNOWS").key()].into_iter().collect()
    );
}

// --- Scenario: dangling endpoint yields exactly one placeholder, edge kept ---

#[test]
fn dangling_endpoint_synthesized_once_across_edges() {
    let doc = GraphDocument::new()
        .with_node(Node::new("A", "Person"))
        .with_relationship(Edge::new("A", "Ghost", "KNOWS"))
        .with_relationship(Edge::new("Ghost", "A", "HAUNTS"))
        .with_relationship(Edge::new("Ghost", "Ghost", "IS"));

    let graph = GraphAssembler::new().assemble(&[doc]).unwrap();

    let ghosts: Vec<_> = graph.nodes().iter().filter(|n| n.id.as_str() == "Ghost").collect();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].node_type, UNKNOWN_NODE_TYPE);
    assert_eq!(graph.edge_count(), 3);
    assert!(graph.dangling_edges().is_empty());
}

#[test]
fn node_declared_in_later_document_is_not_shadowed_by_placeholder() {
    let first = GraphDocument::new()
        .with_node(Node::new("A", "Person"))
        .with_relationship(Edge::new("A", "B", "KNOWS"));
    let second = GraphDocument::new().with_node(Node::new("B", "Person"));

    let graph = GraphAssembler::new().assemble(&[first, second]).unwrap();

    assert_eq!(graph.get_node(&NodeId::from("B")).unwrap().node_type, "Person");
    assert_eq!(graph.placeholder_count(), 0);
}

// --- Scenario: dedup idempotence ---

#[test]
fn merging_same_document_twice_equals_once() {
    let assembler = GraphAssembler::new();
    let once = assembler.assemble(&[people_doc()]).unwrap();
    let twice = assembler.assemble(&[people_doc(), people_doc()]).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn merging_twice_is_idempotent_under_last_write() {
    let assembler = GraphAssembler::with_policy(MergePolicy::LastWrite);
    let once = assembler.assemble(&[places_doc()]).unwrap();
    let twice = assembler.assemble(&[places_doc(), places_doc()]).unwrap();
    assert_eq!(once, twice);
}

// --- Scenario: node set independent of document order ---

#[test]
fn node_set_is_order_independent_without_conflicts() {
    let assembler = GraphAssembler::new();
    let forward = assembler.assemble(&[people_doc(), places_doc()]).unwrap();
    let backward = assembler.assemble(&[places_doc(), people_doc()]).unwrap();

    assert_eq!(forward.node_signature(), backward.node_signature());
    assert!(forward.same_structure(&backward));

    // Non-conflicting properties union to the same map either way
    let acme = NodeId::from("Acme");
    assert_eq!(
        forward.get_node(&acme).unwrap().properties,
        backward.get_node(&acme).unwrap().properties
    );
}

// --- Scenario: conflict resolution is a fixed rule ---

#[test]
fn first_seen_type_wins_by_default() {
    let a = GraphDocument::new().with_node(Node::new("Mercury", "Planet"));
    let b = GraphDocument::new().with_node(Node::new("Mercury", "Element"));

    let graph = GraphAssembler::new().assemble(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(graph.get_node(&NodeId::from("Mercury")).unwrap().node_type, "Planet");

    let graph = GraphAssembler::new().assemble(&[b, a]).unwrap();
    assert_eq!(graph.get_node(&NodeId::from("Mercury")).unwrap().node_type, "Element");
}

#[test]
fn last_write_type_wins_when_configured() {
    let a = GraphDocument::new().with_node(Node::new("Mercury", "Planet"));
    let b = GraphDocument::new().with_node(Node::new("Mercury", "Element"));

    let graph = GraphAssembler::with_policy(MergePolicy::LastWrite)
        .assemble(&[a, b])
        .unwrap();
    assert_eq!(graph.get_node(&NodeId::from("Mercury")).unwrap().node_type, "Element");
}

#[test]
fn edge_property_collision_follows_policy() {
    let a = GraphDocument::new().with_relationship(Edge::new("A", "B", "PAID").with_property("amount", "10"));
    let b = GraphDocument::new().with_relationship(Edge::new("A", "B", "PAID").with_property("amount", "20"));
    let key = Edge::new("A", "B", "PAID").key();

    let first = GraphAssembler::new().assemble(&[a.clone(), b.clone()]).unwrap();
    assert_eq!(first.get_edge(&key).unwrap().properties["amount"], "10");

    let last = GraphAssembler::with_policy(MergePolicy::LastWrite).assemble(&[a, b]).unwrap();
    assert_eq!(last.get_edge(&key).unwrap().properties["amount"], "20");
}

// --- Scenario: distinct relation types between the same pair are kept ---

#[test]
fn multi_edges_with_different_types_are_preserved() {
    let doc = GraphDocument::new()
        .with_node(Node::new("A", "Person"))
        .with_node(Node::new("B", "Person"))
        .with_relationship(Edge::new("A", "B", "KNOWS"))
        .with_relationship(Edge::new("A", "B", "MARRIED_TO"))
        .with_relationship(Edge::new("B", "A", "KNOWS"));

    let graph = GraphAssembler::new().assemble(&[doc]).unwrap();
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn failed_document_leaves_builder_untouched() {
    let mut builder = GraphAssembler::new().builder();
    builder.add_document(people_doc()).unwrap();

    let bad = GraphDocument::new()
        .with_node(Node::new("Zed", "Person"))
        .with_node(Node::new("", "Person"));
    assert!(builder.add_document(bad).is_err());

    let (graph, report) = builder.finish();
    assert_eq!(report.documents, 1);
    assert!(graph.get_node(&NodeId::from("Zed")).is_none());
}

#[test]
fn to_document_reassembles_to_same_graph() {
    let graph = GraphAssembler::new().assemble(&[people_doc(), places_doc()]).unwrap();
    let again = GraphAssembler::new().assemble(&[graph.to_document()]).unwrap();
    assert_eq!(graph, again);
}

#[test]
fn empty_property_values_never_reach_the_graph() {
    let doc = GraphDocument::new()
        .with_node(Node::new("A", "Person").with_property("alias", "").with_property("age", "40"))
        .with_relationship(Edge::new("A", "B", "KNOWS").with_property("since", ""));
    let graph = GraphAssembler::new().assemble(&[doc]).unwrap();

    let a = graph.get_node(&NodeId::from("A")).unwrap();
    assert!(!a.properties.contains_key("alias"));
    assert_eq!(a.properties["age"], "40");
    assert!(graph.edges()[0].properties.is_empty());
}

#[test]
fn empty_value_does_not_block_a_later_first_seen_value() {
    let first = GraphDocument::new().with_node(Node::new("A", "Person").with_property("alias", ""));
    let second = GraphDocument::new().with_node(Node::new("A", "Person").with_property("alias", "Al"));
    let graph = GraphAssembler::new().assemble(&[first, second]).unwrap();
    assert_eq!(graph.get_node(&NodeId::from("A")).unwrap().properties["alias"], "Al");
}
