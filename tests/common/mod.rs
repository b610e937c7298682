//! Common test utilities for textgraph integration tests
//!
//! Provides a deterministic sentence extractor, graph fixtures and a
//! seeded random graph generator for round-trip checks.

pub mod sentence_extractor;

pub use sentence_extractor::SentenceExtractor;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use textgraph::{Edge, GraphDocument, Node};

/// `{A:Person} -KNOWS-> B`, with B never declared.
#[allow(dead_code)]
pub fn reference_document() -> GraphDocument {
    GraphDocument::new()
        .with_node(Node::new("A", "Person"))
        .with_relationship(Edge::new("A", "B", "KNOWS"))
}

const TYPES: &[&str] = &["Person", "Organization", "Location", "Concept"];
const RELATIONS: &[&str] = &["KNOWS", "WORKS_AT", "LOCATED_IN", "MENTIONS"];
const AWKWARD_VALUES: &[&str] = &[
    "plain",
    "comma, inside",
    "\"quoted\"",
    "line\nbreak",
    "  padded  ",
    "semi;colon",
    "ünïcödé",
    "",
];

/// Random documents over a small id pool, so ids repeat across documents
/// and some edges dangle.
#[allow(dead_code)]
pub fn random_documents(seed: u64, count: usize) -> Vec<GraphDocument> {
    let mut rng = StdRng::seed_from_u64(seed);
    let ids: Vec<String> = (0..12).map(|i| format!("entity {}", i)).collect();

    (0..count)
        .map(|_| {
            let mut doc = GraphDocument::new();
            for _ in 0..rng.gen_range(1..6) {
                let id = ids.choose(&mut rng).map(String::as_str).unwrap_or("entity 0");
                let ty = TYPES.choose(&mut rng).copied().unwrap_or("Concept");
                let mut node = Node::new(id, ty);
                if rng.gen_bool(0.5) {
                    let value = AWKWARD_VALUES.choose(&mut rng).copied().unwrap_or("plain");
                    node = node.with_property("note", value);
                }
                if rng.gen_bool(0.2) {
                    node = node.with_property("type", "shadowed");
                }
                doc.nodes.push(node);
            }
            for _ in 0..rng.gen_range(0..6) {
                let source = ids.choose(&mut rng).map(String::as_str).unwrap_or("entity 0");
                let target = ids.choose(&mut rng).map(String::as_str).unwrap_or("entity 1");
                let rel = RELATIONS.choose(&mut rng).copied().unwrap_or("MENTIONS");
                let mut edge = Edge::new(source, target, rel);
                if rng.gen_bool(0.3) {
                    let value = AWKWARD_VALUES.choose(&mut rng).copied().unwrap_or("plain");
                    edge = edge.with_property("evidence", value);
                }
                doc.relationships.push(edge);
            }
            doc
        })
        .collect()
}
