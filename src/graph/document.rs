//! GraphDocument: one batch of nodes and relationships from a single extraction
//!
//! Extraction output arrives as loosely-shaped JSON. `GraphDocument::from_value`
//! is the boundary where that JSON is checked against the node/edge contract;
//! anything structurally wrong becomes an `AssemblyError::Shape` here instead of
//! travelling further down the pipeline.

use super::assembler::AssemblyError;
use super::edge::Edge;
use super::node::{Node, NodeId, Properties};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One extraction unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub relationships: Vec<Edge>,
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_relationship(mut self, edge: Edge) -> Self {
        self.relationships.push(edge);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Parse a document from extraction JSON.
    ///
    /// Accepted shape:
    /// ```json
    /// {
    ///   "nodes": [{ "id": "Marie Curie", "type": "Person", "properties": { "born": "1867" } }],
    ///   "relationships": [{ "source": "Marie Curie", "target": "Sorbonne", "type": "WORKED_AT" }]
    /// }
    /// ```
    ///
    /// Aliases: `label` for a node's `type`; `edges` for `relationships`;
    /// `source_id`/`target_id` for endpoints; `relation_type`/`relationship`
    /// for an edge's `type`. An endpoint may also be a nested node object
    /// (`{"id": .., "type": ..}`), in which case that node is declared too.
    /// Scalar property values are stringified; `null` values are dropped.
    pub fn from_value(value: &Value) -> Result<Self, AssemblyError> {
        let obj = value
            .as_object()
            .ok_or_else(|| shape(format!("graph document must be an object, got {}", kind(value))))?;

        let mut doc = GraphDocument::new();

        if let Some(nodes) = obj.get("nodes") {
            let nodes = nodes
                .as_array()
                .ok_or_else(|| shape(format!("`nodes` must be an array, got {}", kind(nodes))))?;
            for (i, raw) in nodes.iter().enumerate() {
                doc.nodes.push(parse_node(raw).map_err(|e| e.at(format!("nodes[{}]", i)))?);
            }
        }

        let rels = obj.get("relationships").or_else(|| obj.get("edges"));
        if let Some(rels) = rels {
            let rels = rels.as_array().ok_or_else(|| {
                shape(format!("`relationships` must be an array, got {}", kind(rels)))
            })?;
            for (i, raw) in rels.iter().enumerate() {
                let (edge, declared) = parse_edge(raw)
                    .map_err(|e| e.at(format!("relationships[{}]", i)))?;
                doc.nodes.extend(declared);
                doc.relationships.push(edge);
            }
        }

        Ok(doc)
    }

    /// Parse a JSON array of documents, or a single document object.
    pub fn many_from_value(value: &Value) -> Result<Vec<Self>, AssemblyError> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| Self::from_value(v).map_err(|e| e.at(format!("[{}]", i))))
                .collect(),
            other => Ok(vec![Self::from_value(other)?]),
        }
    }
}

fn shape(msg: String) -> AssemblyError {
    AssemblyError::Shape(msg)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Identifiers may come through as strings or numbers.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_string(obj: &Map<String, Value>, keys: &[&str]) -> Result<String, AssemblyError> {
    let found = keys.iter().find_map(|k| obj.get(*k).map(|v| (*k, v)));
    match found {
        Some((key, v)) => scalar_string(v)
            .ok_or_else(|| shape(format!("`{}` must be a string, got {}", key, kind(v)))),
        None => Err(shape(format!("missing `{}`", keys[0]))),
    }
}

fn parse_properties(obj: &Map<String, Value>) -> Result<Properties, AssemblyError> {
    let mut props = Properties::new();
    let Some(raw) = obj.get("properties") else {
        return Ok(props);
    };
    let map = match raw {
        Value::Null => return Ok(props),
        Value::Object(map) => map,
        other => {
            return Err(shape(format!("`properties` must be an object, got {}", kind(other))))
        }
    };
    for (k, v) in map {
        let value = match v {
            Value::Null => continue,
            Value::String(s) if s.is_empty() => continue,
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            nested => nested.to_string(),
        };
        props.insert(k.clone(), value);
    }
    Ok(props)
}

fn parse_node(raw: &Value) -> Result<Node, AssemblyError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| shape(format!("node must be an object, got {}", kind(raw))))?;
    let id = required_string(obj, &["id"])?;
    let node_type = required_string(obj, &["type", "label"])?;
    Ok(Node {
        id: NodeId::new(id),
        node_type,
        properties: parse_properties(obj)?,
    })
}

/// An endpoint is either an id or an embedded node.
fn parse_endpoint(
    obj: &Map<String, Value>,
    keys: &[&str],
) -> Result<(NodeId, Option<Node>), AssemblyError> {
    match keys.iter().find_map(|k| obj.get(*k)) {
        Some(nested @ Value::Object(_)) => {
            let node = parse_node(nested)?;
            Ok((node.id.clone(), Some(node)))
        }
        Some(_) => Ok((NodeId::new(required_string(obj, keys)?), None)),
        None => Err(shape(format!("missing `{}`", keys[0]))),
    }
}

fn parse_edge(raw: &Value) -> Result<(Edge, Vec<Node>), AssemblyError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| shape(format!("relationship must be an object, got {}", kind(raw))))?;
    let (source, source_node) = parse_endpoint(obj, &["source", "source_id"])?;
    let (target, target_node) = parse_endpoint(obj, &["target", "target_id"])?;
    let relationship = required_string(obj, &["type", "relation_type", "relationship"])?;

    let edge = Edge {
        source,
        target,
        relationship,
        properties: parse_properties(obj)?,
    };
    let declared = source_node.into_iter().chain(target_node).collect();
    Ok((edge, declared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_canonical_shape() {
        let doc = GraphDocument::from_value(&json!({
            "nodes": [
                { "id": "Marie Curie", "type": "Person", "properties": { "born": 1867 } },
                { "id": "Sorbonne", "type": "Organization" }
            ],
            "relationships": [
                { "source": "Marie Curie", "target": "Sorbonne", "type": "WORKED_AT" }
            ]
        }))
        .unwrap();

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].properties.get("born").map(String::as_str), Some("1867"));
        assert_eq!(doc.relationships, vec![Edge::new("Marie Curie", "Sorbonne", "WORKED_AT")]);
    }

    #[test]
    fn accepts_aliases_and_nested_endpoints() {
        let doc = GraphDocument::from_value(&json!({
            "nodes": [{ "id": "A", "label": "Person" }],
            "edges": [{
                "source_id": "A",
                "target": { "id": "B", "type": "City" },
                "relation_type": "LIVES_IN"
            }]
        }))
        .unwrap();

        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[1], Node::new("B", "City"));
        assert_eq!(doc.relationships[0].key(), Edge::new("A", "B", "LIVES_IN").key());
    }

    #[test]
    fn missing_sections_yield_empty_document() {
        let doc = GraphDocument::from_value(&json!({})).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn non_object_document_is_a_shape_error() {
        let err = GraphDocument::from_value(&json!("nodes")).unwrap_err();
        assert!(matches!(err, AssemblyError::Shape(ref m) if m.contains("string")));
    }

    #[test]
    fn node_without_type_is_rejected_with_location() {
        let err = GraphDocument::from_value(&json!({ "nodes": [{ "id": "A" }] })).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nodes[0]"), "{}", msg);
        assert!(msg.contains("type"), "{}", msg);
    }

    #[test]
    fn relationships_must_be_an_array() {
        let err = GraphDocument::from_value(&json!({ "relationships": {} })).unwrap_err();
        assert!(matches!(err, AssemblyError::Shape(_)));
    }

    #[test]
    fn null_and_empty_properties_are_dropped() {
        let doc = GraphDocument::from_value(&json!({
            "nodes": [{ "id": "A", "type": "T", "properties": { "x": null, "alias": "", "ok": true } }]
        }))
        .unwrap();
        let props = &doc.nodes[0].properties;
        assert!(!props.contains_key("x"));
        assert!(!props.contains_key("alias"));
        assert_eq!(props.get("ok").map(String::as_str), Some("true"));
    }

    #[test]
    fn many_accepts_array_or_single_object() {
        let many = GraphDocument::many_from_value(&json!([{ "nodes": [] }, {}])).unwrap();
        assert_eq!(many.len(), 2);
        let one = GraphDocument::many_from_value(&json!({ "nodes": [] })).unwrap();
        assert_eq!(one.len(), 1);
    }
}
