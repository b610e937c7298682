//! Interactive HTML rendering with vis-network

use super::{RenderedGraph, Renderer};
use crate::config::RenderConfig;
use crate::graph::{AssembledGraph, Edge, Node, UNKNOWN_NODE_TYPE};
use serde_json::{json, Value};

const PALETTE: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#86bcb6",
];
const PLACEHOLDER_COLOR: &str = "#bab0ac";

/// Renders a standalone page that loads vis-network and draws the graph.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    config: RenderConfig,
}

impl HtmlRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> Value {
        json!({
            "physics": {
                "enabled": self.config.physics,
                "solver": "forceAtlas2Based",
                "stabilization": { "iterations": 200 },
            },
            "interaction": { "hover": true, "navigationButtons": true },
            "edges": { "smooth": { "type": "dynamic" }, "font": { "size": 10, "align": "middle" } },
            "nodes": { "shape": "dot", "size": 16 },
        })
    }

    fn data(&self, graph: &AssembledGraph) -> Value {
        let nodes: Vec<Value> = graph.nodes().iter().map(node_json).collect();
        let edges: Vec<Value> = graph.edges().iter().enumerate().map(|(i, e)| edge_json(i, e)).collect();
        json!({ "nodes": nodes, "edges": edges, "options": self.options() })
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, graph: &AssembledGraph) -> RenderedGraph {
        let data = script_safe(&self.data(graph).to_string());
        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Knowledge Graph</title>
<script src="{script}"></script>
<style>
  body {{ margin: 0; font-family: sans-serif; }}
  #graph {{ width: {width}; height: {height}; border: 1px solid #d3d3d3; }}
</style>
</head>
<body>
<div id="graph"></div>
<script>
  const data = {data};
  new vis.Network(
    document.getElementById("graph"),
    {{ nodes: new vis.DataSet(data.nodes), edges: new vis.DataSet(data.edges) }},
    data.options
  );
</script>
</body>
</html>
"#,
            script = escape_html(&self.config.vis_network_url),
            width = css_value(&self.config.width),
            height = css_value(&self.config.height),
            data = data,
        );
        RenderedGraph::new(html)
    }
}

fn node_json(node: &Node) -> Value {
    let mut title = node.node_type.clone();
    for (k, v) in &node.properties {
        title.push_str(&format!("\n{}: {}", k, v));
    }
    json!({
        "id": node.id.as_str(),
        "label": node.id.as_str(),
        "group": node.node_type,
        "title": title,
        "color": color_for(&node.node_type),
    })
}

fn edge_json(index: usize, edge: &Edge) -> Value {
    let mut title = edge.relationship.clone();
    for (k, v) in &edge.properties {
        title.push_str(&format!("\n{}: {}", k, v));
    }
    json!({
        "id": index,
        "from": edge.source.as_str(),
        "to": edge.target.as_str(),
        "label": edge.relationship,
        "title": title,
        "arrows": "to",
    })
}

/// Stable color per node type (FNV-1a over the type name).
fn color_for(node_type: &str) -> &'static str {
    if node_type == UNKNOWN_NODE_TYPE {
        return PLACEHOLDER_COLOR;
    }
    let hash = node_type
        .bytes()
        .fold(0xcbf29ce484222325_u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
    PALETTE[(hash % PALETTE.len() as u64) as usize]
}

/// JSON is inlined in a `<script>` element; `<`, `>` and `&` only occur
/// inside string literals there, so unicode escapes keep it inert.
fn script_safe(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Keep only characters that can appear in a plain CSS length.
fn css_value(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '%' | '-'))
        .collect()
}
