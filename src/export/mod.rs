//! Tabular export: nodes and edges as two CSV tables
//!
//! Node table: `id, type, <property columns>`.
//! Edge table: `source_id, target_id, relation_type, <property columns>`.
//!
//! Property columns are the sorted union of property keys in the table. A
//! property whose name collides with a fixed column (ignoring leading
//! underscores) is written with one extra leading underscore and restored
//! on parse. Cells for properties a row lacks are empty; empty cells parse
//! back as absent properties.

mod parse;
mod table;

pub use parse::parse_tables;
pub use table::ExportTable;

use crate::graph::{AssembledGraph, AssemblyError, GraphAssembler, GraphDocument, MergePolicy, Properties};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Download name of the node table.
pub const NODES_FILE_NAME: &str = "points.csv";
/// Download name of the edge table.
pub const EDGES_FILE_NAME: &str = "links.csv";

pub const NODE_COLUMNS: [&str; 2] = ["id", "type"];
pub const EDGE_COLUMNS: [&str; 3] = ["source_id", "target_id", "relation_type"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{table} table is missing column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },

    #[error("cannot assemble graph for export: {0}")]
    Assembly(#[from] AssemblyError),
}

/// The two CSV payloads of one export, UTF-8 with a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTables {
    pub nodes: Vec<u8>,
    pub edges: Vec<u8>,
}

impl ExportedTables {
    /// `(file name, bytes)` pairs in download order.
    pub fn files(&self) -> [(&'static str, &[u8]); 2] {
        [(NODES_FILE_NAME, self.nodes.as_slice()), (EDGES_FILE_NAME, self.edges.as_slice())]
    }

    /// Write both tables into `dir` under their download names.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(2);
        for (name, bytes) in self.files() {
            let path = dir.join(name);
            std::fs::write(&path, bytes)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// What an export can start from.
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    Graph(&'a AssembledGraph),
    Documents(&'a [GraphDocument], MergePolicy),
}

impl<'a> From<&'a AssembledGraph> for ExportSource<'a> {
    fn from(graph: &'a AssembledGraph) -> Self {
        Self::Graph(graph)
    }
}

impl<'a> From<&'a [GraphDocument]> for ExportSource<'a> {
    fn from(docs: &'a [GraphDocument]) -> Self {
        Self::Documents(docs, MergePolicy::default())
    }
}

impl<'a> From<&'a Vec<GraphDocument>> for ExportSource<'a> {
    fn from(docs: &'a Vec<GraphDocument>) -> Self {
        Self::Documents(docs.as_slice(), MergePolicy::default())
    }
}

/// Export graph documents or an assembled graph as `(nodes, edges)` CSV.
pub fn export_tables<'a>(source: impl Into<ExportSource<'a>>) -> Result<ExportedTables, ExportError> {
    match source.into() {
        ExportSource::Graph(graph) => TableExporter::new().export(graph),
        ExportSource::Documents(docs, policy) => {
            let graph = GraphAssembler::with_policy(policy).assemble(docs)?;
            TableExporter::new().export(&graph)
        }
    }
}

/// Builds export tables from an assembled graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableExporter;

impl TableExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn node_table(&self, graph: &AssembledGraph) -> ExportTable {
        let keys = property_keys(graph.nodes().iter().map(|n| &n.properties));
        let mut table = ExportTable::new(columns(&NODE_COLUMNS, &keys));
        for node in graph.nodes() {
            let mut row = vec![node.id.to_string(), node.node_type.clone()];
            row.extend(property_cells(&node.properties, &keys));
            table.push_row(row);
        }
        table
    }

    pub fn edge_table(&self, graph: &AssembledGraph) -> ExportTable {
        let keys = property_keys(graph.edges().iter().map(|e| &e.properties));
        let mut table = ExportTable::new(columns(&EDGE_COLUMNS, &keys));
        for edge in graph.edges() {
            let mut row = vec![
                edge.source.to_string(),
                edge.target.to_string(),
                edge.relationship.clone(),
            ];
            row.extend(property_cells(&edge.properties, &keys));
            table.push_row(row);
        }
        table
    }

    pub fn export(&self, graph: &AssembledGraph) -> Result<ExportedTables, ExportError> {
        let tables = ExportedTables {
            nodes: self.node_table(graph).to_csv()?,
            edges: self.edge_table(graph).to_csv()?,
        };
        debug!(
            node_rows = graph.node_count(),
            edge_rows = graph.edge_count(),
            node_bytes = tables.nodes.len(),
            edge_bytes = tables.edges.len(),
            "exported tables"
        );
        Ok(tables)
    }
}

fn property_keys<'a>(maps: impl Iterator<Item = &'a Properties>) -> Vec<String> {
    let keys: BTreeSet<&String> = maps.flat_map(|m| m.keys()).collect();
    keys.into_iter().cloned().collect()
}

fn columns(fixed: &[&str], keys: &[String]) -> Vec<String> {
    fixed
        .iter()
        .map(|c| c.to_string())
        .chain(keys.iter().map(|k| encode_property_column(k, fixed)))
        .collect()
}

fn property_cells<'a>(props: &'a Properties, keys: &'a [String]) -> impl Iterator<Item = String> + 'a {
    keys.iter().map(move |k| props.get(k).cloned().unwrap_or_default())
}

fn collides(name: &str, fixed: &[&str]) -> bool {
    fixed.contains(&name.trim_start_matches('_'))
}

pub(crate) fn encode_property_column(key: &str, fixed: &[&str]) -> String {
    if collides(key, fixed) {
        format!("_{}", key)
    } else {
        key.to_string()
    }
}

pub(crate) fn decode_property_column(column: &str, fixed: &[&str]) -> String {
    match column.strip_prefix('_') {
        Some(rest) if collides(column, fixed) => rest.to_string(),
        _ => column.to_string(),
    }
}
