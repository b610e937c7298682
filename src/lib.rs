//! textgraph: turn free text into an interactive knowledge graph
//!
//! Text is sent to an extraction model, which returns graph documents
//! (typed nodes and directed, typed relationships). The documents are merged
//! into one consistent graph, rendered as a self-contained HTML page, and
//! exported as two CSV tables (`points.csv` for nodes, `links.csv` for edges).
//!
//! # Core Concepts
//!
//! - **GraphDocument**: one extraction result, validated at the boundary
//! - **AssembledGraph**: deduplicated nodes and edges; every edge endpoint exists
//! - **SessionCache**: the last successful generation, so downloads never re-extract
//!
//! # Example
//!
//! ```
//! use textgraph::{export_tables, Edge, GraphAssembler, GraphDocument, Node};
//!
//! let doc = GraphDocument::new()
//!     .with_node(Node::new("A", "Person"))
//!     .with_relationship(Edge::new("A", "B", "KNOWS"));
//! let graph = GraphAssembler::new().assemble(&[doc]).unwrap();
//! assert_eq!(graph.node_count(), 2); // B is synthesized as "Unknown"
//!
//! let tables = export_tables(&graph).unwrap();
//! assert!(tables.edges.starts_with(b"source_id,target_id,relation_type"));
//! ```

pub mod config;
pub mod export;
pub mod extract;
mod graph;
pub mod pipeline;
pub mod render;
pub mod session;

pub use config::{Config, ConfigError};
pub use export::{export_tables, parse_tables, ExportError, ExportedTables, TableExporter};
pub use extract::{decode_upload, ChatExtractor, ExtractionError, Extractor, MockExtractor};
pub use graph::{
    AssembledGraph, AssemblyBuilder, AssemblyError, AssemblyReport, Edge, EdgeKey, GraphAssembler,
    GraphDocument, MergePolicy, Node, NodeId, Properties, UNKNOWN_NODE_TYPE,
};
pub use pipeline::{Generation, Pipeline, PipelineError};
pub use render::{HtmlRenderer, RenderedGraph, Renderer, HTML_FILE_NAME};
pub use session::{CacheEntry, SessionCache, SessionError, SessionId, SessionRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
