//! Rebuild an AssembledGraph from exported node and edge tables

use super::table::ExportTable;
use super::{decode_property_column, ExportError, EDGE_COLUMNS, NODE_COLUMNS};
use crate::graph::{AssembledGraph, Edge, GraphAssembler, GraphDocument, Node, NodeId, Properties};

struct Layout {
    fixed: Vec<usize>,
    properties: Vec<(usize, String)>,
}

fn layout(
    table: &ExportTable,
    name: &'static str,
    fixed: &'static [&'static str],
) -> Result<Layout, ExportError> {
    let mut fixed_idx = Vec::with_capacity(fixed.len());
    for &column in fixed {
        let idx = table
            .column_index(column)
            .ok_or(ExportError::MissingColumn { table: name, column })?;
        fixed_idx.push(idx);
    }

    let properties = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| !fixed_idx.contains(i))
        .map(|(i, c)| (i, decode_property_column(c, fixed)))
        .collect();

    Ok(Layout {
        fixed: fixed_idx,
        properties,
    })
}

fn row_properties(row: &[String], layout: &Layout) -> Properties {
    layout
        .properties
        .iter()
        .filter(|(i, _)| !row[*i].is_empty())
        .map(|(i, key)| (key.clone(), row[*i].clone()))
        .collect()
}

/// Parse exported CSV tables back into a graph.
///
/// Rows are fed through the assembler, so the result satisfies the same
/// invariants as any freshly assembled graph.
pub fn parse_tables(nodes_csv: &[u8], edges_csv: &[u8]) -> Result<AssembledGraph, ExportError> {
    let nodes = ExportTable::from_csv(nodes_csv)?;
    let edges = ExportTable::from_csv(edges_csv)?;

    let node_layout = layout(&nodes, "nodes", &NODE_COLUMNS)?;
    let edge_layout = layout(&edges, "edges", &EDGE_COLUMNS)?;

    let mut doc = GraphDocument::new();
    for row in nodes.rows() {
        let f = &node_layout.fixed;
        doc.nodes.push(Node {
            id: NodeId::new(row[f[0]].clone()),
            node_type: row[f[1]].clone(),
            properties: row_properties(row, &node_layout),
        });
    }
    for row in edges.rows() {
        let f = &edge_layout.fixed;
        doc.relationships.push(Edge {
            source: NodeId::new(row[f[0]].clone()),
            target: NodeId::new(row[f[1]].clone()),
            relationship: row[f[2]].clone(),
            properties: row_properties(row, &edge_layout),
        });
    }

    Ok(GraphAssembler::new().assemble(&[doc])?)
}
