//! Render adapters: turn an assembled graph into a displayable artifact
//!
//! The artifact is opaque to the pipeline: it is produced once per
//! generation, cached, and handed to whatever front end displays it.

mod html;

pub use html::HtmlRenderer;

use crate::graph::AssembledGraph;
use std::path::{Path, PathBuf};

/// File name used when the artifact is written to disk.
pub const HTML_FILE_NAME: &str = "knowledge_graph.html";

/// A self-contained visual document for one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGraph {
    html: String,
}

impl RenderedGraph {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_string(self) -> String {
        self.html
    }

    /// Write the page to `dir/knowledge_graph.html`.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(HTML_FILE_NAME);
        std::fs::write(&path, &self.html)?;
        Ok(path)
    }
}

/// Contract for visual rendering.
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &AssembledGraph) -> RenderedGraph;
}
