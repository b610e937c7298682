//! Mock extractor for testing and offline runs: returns scripted results

use super::{require_text, ExtractionError, Extractor};
use crate::graph::GraphDocument;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Scripted {
    Documents(Vec<GraphDocument>),
    Failure(String),
}

/// Extractor that replays preconfigured outcomes.
///
/// Queued outcomes (`then_return`, `then_fail`) are consumed one per call;
/// once the queue is empty the fallback outcome (`returning`, `failing`)
/// repeats.
pub struct MockExtractor {
    available: bool,
    queue: Mutex<VecDeque<Scripted>>,
    fallback: Option<Scripted>,
    calls: AtomicUsize,
}

impl MockExtractor {
    /// A mock with no scripted outcomes; every call fails until scripted.
    pub fn new() -> Self {
        Self {
            available: true,
            queue: Mutex::new(VecDeque::new()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Always return these documents.
    pub fn returning(documents: Vec<GraphDocument>) -> Self {
        Self {
            fallback: Some(Scripted::Documents(documents)),
            ..Self::new()
        }
    }

    /// Always fail with an upstream error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fallback: Some(Scripted::Failure(message.into())),
            ..Self::new()
        }
    }

    /// A mock that reports the service as unavailable.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Queue a successful outcome for the next unscripted call.
    pub fn then_return(self, documents: Vec<GraphDocument>) -> Self {
        self.push(Scripted::Documents(documents));
        self
    }

    /// Queue a failure for the next unscripted call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Failure(message.into()));
        self
    }

    /// Number of `extract` calls that reached the mock (after input checks).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, outcome: Scripted) {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(outcome);
    }

    fn next_outcome(&self) -> Option<Scripted> {
        let queued = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        queued.or_else(|| self.fallback.clone())
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn id(&self) -> &str {
        "mock"
    }

    async fn extract(&self, text: &str) -> Result<Vec<GraphDocument>, ExtractionError> {
        require_text(text)?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.available {
            return Err(ExtractionError::Unavailable(
                "mock extractor configured as unavailable".to_string(),
            ));
        }

        match self.next_outcome() {
            Some(Scripted::Documents(docs)) => Ok(docs),
            Some(Scripted::Failure(msg)) => Err(ExtractionError::Upstream(msg)),
            None => Err(ExtractionError::Upstream("no scripted outcome left".to_string())),
        }
    }
}
