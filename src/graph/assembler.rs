//! GraphAssembler: merges graph documents into one AssembledGraph
//!
//! Merge rules:
//! - nodes are unified by id; type and property collisions follow the `MergePolicy`
//! - edges are unified by `(source, target, relationship)`; properties are unioned
//! - an edge endpoint no document declares becomes an `Unknown` placeholder node
//!
//! Placeholders are synthesized only after every document's nodes are merged,
//! so a node declared in a later document is never shadowed by a placeholder.

use super::assembled::{AssembledGraph, NodeMerge};
use super::document::GraphDocument;
use super::edge::Edge;
use super::node::Node;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised when extraction output violates the graph document contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("node has an empty id")]
    EmptyNodeId,

    #[error("node '{0}' has an empty type")]
    EmptyNodeType(String),

    #[error("relationship '{0}' has an empty endpoint")]
    EmptyEndpoint(String),

    #[error("relationship between '{source_id}' and '{target_id}' has an empty type")]
    EmptyRelationType { source_id: String, target_id: String },

    #[error("malformed graph document: {0}")]
    Shape(String),
}

impl AssemblyError {
    /// Prefix a shape error with where in the input it was found.
    pub(crate) fn at(self, location: impl std::fmt::Display) -> Self {
        match self {
            Self::Shape(msg) => Self::Shape(format!("{}: {}", location, msg)),
            other => other,
        }
    }
}

/// How collisions between duplicate nodes (and duplicate edge properties) resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The first value seen for a node type or property key is kept
    #[default]
    FirstSeen,
    /// Later values overwrite earlier ones
    LastWrite,
}

/// Counters describing one assembly run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub documents: usize,
    pub nodes_in: usize,
    pub edges_in: usize,
    pub type_conflicts: usize,
    pub duplicate_edges: usize,
    pub placeholders: usize,
}

/// Stateless entry point for assembly
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphAssembler {
    policy: MergePolicy,
}

impl GraphAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MergePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Merge documents into a single graph.
    pub fn assemble(&self, documents: &[GraphDocument]) -> Result<AssembledGraph, AssemblyError> {
        self.assemble_with_report(documents).map(|(graph, _)| graph)
    }

    pub fn assemble_with_report(
        &self,
        documents: &[GraphDocument],
    ) -> Result<(AssembledGraph, AssemblyReport), AssemblyError> {
        let mut builder = self.builder();
        for doc in documents {
            builder.add_document(doc.clone())?;
        }
        Ok(builder.finish())
    }

    /// Incremental assembly, e.g. while chunks are still being extracted.
    pub fn builder(&self) -> AssemblyBuilder {
        AssemblyBuilder {
            policy: self.policy,
            graph: AssembledGraph::new(),
            pending_edges: Vec::new(),
            report: AssemblyReport::default(),
        }
    }
}

/// Accumulates documents; edges are resolved in `finish`
#[derive(Debug)]
pub struct AssemblyBuilder {
    policy: MergePolicy,
    graph: AssembledGraph,
    pending_edges: Vec<Edge>,
    report: AssemblyReport,
}

impl AssemblyBuilder {
    /// Validate and merge one document.
    ///
    /// A document that fails validation contributes nothing. Empty property
    /// values are dropped, since an export cell cannot tell them from absent.
    pub fn add_document(&mut self, doc: GraphDocument) -> Result<(), AssemblyError> {
        validate(&doc)?;

        self.report.documents += 1;
        self.report.nodes_in += doc.nodes.len();
        self.report.edges_in += doc.relationships.len();

        for mut node in doc.nodes {
            node.properties.retain(|_, v| !v.is_empty());
            if let NodeMerge::Merged { type_conflict: true } = self.graph.merge_node(node, self.policy) {
                self.report.type_conflicts += 1;
            }
        }
        self.pending_edges.extend(doc.relationships.into_iter().map(|mut edge| {
            edge.properties.retain(|_, v| !v.is_empty());
            edge
        }));
        Ok(())
    }

    pub fn finish(mut self) -> (AssembledGraph, AssemblyReport) {
        for edge in std::mem::take(&mut self.pending_edges) {
            for endpoint in [&edge.source, &edge.target] {
                if !self.graph.contains_node(endpoint) {
                    debug!(node = %endpoint, edge = %edge.key(), "synthesizing placeholder for dangling endpoint");
                    self.graph.merge_node(Node::placeholder(endpoint.clone()), self.policy);
                    self.report.placeholders += 1;
                }
            }
            if !self.graph.merge_edge(edge, self.policy) {
                self.report.duplicate_edges += 1;
            }
        }

        if self.report.type_conflicts > 0 {
            warn!(
                conflicts = self.report.type_conflicts,
                policy = ?self.policy,
                "conflicting node types resolved by merge policy"
            );
        }
        if self.report.placeholders > 0 {
            warn!(placeholders = self.report.placeholders, "dangling edges referenced undeclared nodes");
        }
        debug!(
            documents = self.report.documents,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "assembled graph"
        );

        (self.graph, self.report)
    }
}

fn validate(doc: &GraphDocument) -> Result<(), AssemblyError> {
    for node in &doc.nodes {
        if node.id.is_empty() {
            return Err(AssemblyError::EmptyNodeId);
        }
        if node.node_type.trim().is_empty() {
            return Err(AssemblyError::EmptyNodeType(node.id.to_string()));
        }
    }
    for edge in &doc.relationships {
        if edge.source.is_empty() || edge.target.is_empty() {
            return Err(AssemblyError::EmptyEndpoint(edge.key().to_string()));
        }
        if edge.relationship.trim().is_empty() {
            return Err(AssemblyError::EmptyRelationType {
                source_id: edge.source.to_string(),
                target_id: edge.target.to_string(),
            });
        }
    }
    Ok(())
}
