//! Extraction adapters: turn raw text into graph documents
//!
//! Extraction is delegated to an external model. The `Extractor` trait
//! abstracts over the transport so the pipeline doesn't depend on how the
//! model is reached. Two implementations:
//! - `ChatExtractor`: calls an OpenAI-compatible chat-completions endpoint
//! - `MockExtractor`: returns scripted documents or failures (testing, offline runs)
//!
//! Output is non-deterministic: the same text may produce different graphs
//! on different calls. Each call's output is authoritative for that call only.

mod chunk;
mod llm;
mod mock;

pub use chunk::chunk_text;
pub use llm::{normalize_relation_type, ChatExtractor};
pub use mock::MockExtractor;

use crate::graph::{AssemblyError, GraphDocument};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from extraction (upstream or model-output failures).
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("extraction service not available: {0}")]
    Unavailable(String),

    #[error("extraction request failed: {0}")]
    Upstream(String),

    #[error("extraction request timed out: {0}")]
    Timeout(String),

    #[error("model response contained no usable JSON: {0}")]
    MalformedResponse(String),

    /// The model answered with JSON that violates the graph document contract.
    #[error("model output violates graph document contract: {0}")]
    Contract(#[from] AssemblyError),
}

/// Adapter contract for entity/relationship extraction.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short identifier used in logs
    fn id(&self) -> &str;

    /// Extract graph documents from non-empty text.
    ///
    /// May return an empty list when nothing was found.
    async fn extract(&self, text: &str) -> Result<Vec<GraphDocument>, ExtractionError>;
}

/// Reject whitespace-only input before any model call is made.
pub fn require_text(text: &str) -> Result<&str, ExtractionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ExtractionError::EmptyInput)
    } else {
        Ok(trimmed)
    }
}

/// Decode an uploaded `.txt` payload.
pub fn decode_upload(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        ExtractionError::InvalidInput(format!("uploaded file is not valid UTF-8: {}", e))
    })?;
    let text = text.trim_start_matches('\u{feff}');
    require_text(text)?;
    Ok(text.to_string())
}
