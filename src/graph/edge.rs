//! Edge representation: a typed, directed relationship between two nodes

use super::node::{NodeId, Properties};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deduplication key for edges.
///
/// Two edges with the same source, target and relation type are the same edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub source: NodeId,
    pub target: NodeId,
    pub relationship: String,
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})-[{}]->({})", self.source, self.relationship, self.target)
    }
}

/// A directed relationship extracted from text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    #[serde(rename = "source_id")]
    pub source: NodeId,
    /// Target node
    #[serde(rename = "target_id")]
    pub target: NodeId,
    /// Type of relationship (e.g. "WORKS_AT", "KNOWS")
    #[serde(rename = "relation_type")]
    pub relationship: String,
    /// Additional properties
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship: relationship.into(),
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            source: self.source.clone(),
            target: self.target.clone(),
            relationship: self.relationship.clone(),
        }
    }
}
