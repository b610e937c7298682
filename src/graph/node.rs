//! Node representation in the knowledge graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type given to nodes the assembler synthesizes for dangling edge endpoints.
pub const UNKNOWN_NODE_TYPE: &str = "Unknown";

/// Identity of a node, as produced by the extraction adapter.
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Flat string properties attached to nodes and edges.
///
/// Ordered so that exported property columns are deterministic.
pub type Properties = BTreeMap<String, String>;

/// An entity extracted from text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identity within one assembled graph
    pub id: NodeId,
    /// Entity type (e.g. "Person", "Organization")
    #[serde(rename = "type")]
    pub node_type: String,
    /// Free-form attributes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            properties: Properties::new(),
        }
    }

    /// Minimal node standing in for an endpoint nobody declared.
    pub fn placeholder(id: NodeId) -> Self {
        Self::new(id, UNKNOWN_NODE_TYPE)
    }

    /// Add a property to the node
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.node_type == UNKNOWN_NODE_TYPE
    }
}
