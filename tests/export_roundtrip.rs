//! Randomized assembly and CSV round-trip properties.
//!
//! Run with: `cargo test --test export_roundtrip`

mod common;

use common::random_documents;
use std::collections::BTreeSet;
use textgraph::{export_tables, parse_tables, GraphAssembler, GraphDocument, MergePolicy};

const SEEDS: std::ops::Range<u64> = 0..40;

fn node_ids(docs: &[GraphDocument], policy: MergePolicy) -> BTreeSet<String> {
    GraphAssembler::with_policy(policy)
        .assemble(docs)
        .unwrap()
        .nodes()
        .iter()
        .map(|n| n.id.to_string())
        .collect()
}

#[test]
fn parse_of_export_reconstructs_the_graph() {
    for seed in SEEDS {
        let docs = random_documents(seed, 4);
        let graph = GraphAssembler::new().assemble(&docs).unwrap();
        let tables = export_tables(&graph).unwrap();
        let parsed = parse_tables(&tables.nodes, &tables.edges).unwrap();

        assert_eq!(parsed.node_signature(), graph.node_signature(), "seed {}", seed);
        assert_eq!(parsed.edge_triples(), graph.edge_triples(), "seed {}", seed);
        assert_eq!(parsed, graph, "seed {}", seed);
    }
}

#[test]
fn exporting_documents_matches_exporting_their_assembly() {
    for seed in SEEDS {
        let docs = random_documents(seed, 3);
        let graph = GraphAssembler::new().assemble(&docs).unwrap();
        assert_eq!(export_tables(&docs).unwrap(), export_tables(&graph).unwrap(), "seed {}", seed);
    }
}

#[test]
fn merging_twice_equals_merging_once() {
    for policy in [MergePolicy::FirstSeen, MergePolicy::LastWrite] {
        for seed in SEEDS {
            let docs = random_documents(seed, 3);
            let doubled: Vec<GraphDocument> = docs.iter().chain(docs.iter()).cloned().collect();
            let assembler = GraphAssembler::with_policy(policy);
            assert_eq!(
                assembler.assemble(&doubled).unwrap(),
                assembler.assemble(&docs).unwrap(),
                "seed {} policy {:?}",
                seed,
                policy
            );
        }
    }
}

#[test]
fn document_order_does_not_change_ids_or_edges() {
    for seed in SEEDS {
        let docs = random_documents(seed, 4);
        let reversed: Vec<GraphDocument> = docs.iter().rev().cloned().collect();

        assert_eq!(
            node_ids(&docs, MergePolicy::FirstSeen),
            node_ids(&reversed, MergePolicy::FirstSeen),
            "seed {}",
            seed
        );
        let forward = GraphAssembler::new().assemble(&docs).unwrap();
        let backward = GraphAssembler::new().assemble(&reversed).unwrap();
        assert_eq!(forward.edge_triples(), backward.edge_triples(), "seed {}", seed);
    }
}

#[test]
fn every_edge_endpoint_exists() {
    for seed in SEEDS {
        let graph = GraphAssembler::new().assemble(&random_documents(seed, 5)).unwrap();
        assert!(graph.dangling_edges().is_empty(), "seed {}", seed);
        for edge in graph.edges() {
            assert!(graph.contains_node(&edge.source));
            assert!(graph.contains_node(&edge.target));
        }
    }
}
