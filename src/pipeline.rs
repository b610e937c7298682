//! Pipeline: text → extraction → assembly → rendering, with session caching
//!
//! Each call runs the stages sequentially and returns only when all of them
//! are done. The pipeline itself holds no per-session state; callers pass
//! the `SessionCache` they want updated.

use crate::config::Config;
use crate::export::{ExportError, ExportedTables, TableExporter};
use crate::extract::{require_text, ChatExtractor, ExtractionError, Extractor};
use crate::graph::{AssembledGraph, AssemblyError, GraphAssembler, GraphDocument};
use crate::render::{HtmlRenderer, RenderedGraph, Renderer};
use crate::session::{CacheEntry, SessionCache};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(ExtractionError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl From<ExtractionError> for PipelineError {
    fn from(error: ExtractionError) -> Self {
        match error {
            ExtractionError::Contract(e) => Self::Assembly(e),
            other => Self::Extraction(other),
        }
    }
}

/// Output of one successful generation.
#[derive(Debug, Clone)]
pub struct Generation {
    pub documents: Vec<GraphDocument>,
    pub graph: AssembledGraph,
    pub artifact: RenderedGraph,
}

pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    assembler: GraphAssembler,
    renderer: Arc<dyn Renderer>,
    exporter: TableExporter,
}

impl Pipeline {
    /// Default assembler and HTML renderer around the given extractor.
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            assembler: GraphAssembler::new(),
            renderer: Arc::new(HtmlRenderer::default()),
            exporter: TableExporter::new(),
        }
    }

    /// Chat-completions extractor plus assembler and renderer settings from config.
    pub fn from_config(config: &Config) -> Result<Self, ExtractionError> {
        let extractor = ChatExtractor::from_config(&config.extraction)?;
        Ok(Self::with_extractor(config, Arc::new(extractor)))
    }

    /// Config-driven assembler and renderer with a caller-supplied extractor.
    pub fn with_extractor(config: &Config, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            assembler: GraphAssembler::with_policy(config.assembly.merge_policy),
            renderer: Arc::new(HtmlRenderer::new(config.render.clone())),
            exporter: TableExporter::new(),
        }
    }

    pub fn with_assembler(mut self, assembler: GraphAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn extractor_id(&self) -> &str {
        self.extractor.id()
    }

    pub fn exporter(&self) -> &TableExporter {
        &self.exporter
    }

    /// Extract, assemble and render a graph from text.
    pub async fn generate_graph(&self, text: &str) -> Result<Generation, PipelineError> {
        let text = require_text(text)?;
        let started = Instant::now();
        info!(extractor = self.extractor.id(), chars = text.chars().count(), "generating graph");

        let documents = self.extractor.extract(text).await?;
        let generation = self.assemble_documents(documents)?;

        info!(
            documents = generation.documents.len(),
            nodes = generation.graph.node_count(),
            edges = generation.graph.edge_count(),
            placeholders = generation.graph.placeholder_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "graph generated"
        );
        Ok(generation)
    }

    /// Assemble and render documents that were extracted elsewhere.
    pub fn assemble_documents(&self, documents: Vec<GraphDocument>) -> Result<Generation, AssemblyError> {
        let (graph, report) = self.assembler.assemble_with_report(&documents)?;
        info!(
            nodes_in = report.nodes_in,
            edges_in = report.edges_in,
            type_conflicts = report.type_conflicts,
            duplicate_edges = report.duplicate_edges,
            placeholders = report.placeholders,
            "documents assembled"
        );
        let artifact = self.renderer.render(&graph);
        Ok(Generation {
            documents,
            graph,
            artifact,
        })
    }

    /// Generate and store the result in `cache`.
    ///
    /// On failure the cache keeps its previous entry.
    pub async fn generate_into(
        &self,
        cache: &mut SessionCache,
        text: &str,
    ) -> Result<Arc<CacheEntry>, PipelineError> {
        match self.generate_graph(text).await {
            Ok(generation) => Ok(cache.store(generation)),
            Err(e) => {
                warn!(
                    session = %cache.id(),
                    error = %e,
                    cached = cache.is_ready(),
                    "generation failed; previous cache entry kept"
                );
                Err(e)
            }
        }
    }

    /// Export tables from the session cache; `None` until a generation succeeds.
    pub fn export_tables(&self, cache: &SessionCache) -> Result<Option<ExportedTables>, ExportError> {
        cache.export(&self.exporter)
    }
}
