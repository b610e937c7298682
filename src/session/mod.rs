//! Session cache: the last successful generation for one user session
//!
//! A `SessionCache` holds at most one `CacheEntry`. The entry is replaced
//! wholesale by `store`; nothing mutates it in place, so readers holding an
//! `Arc<CacheEntry>` keep a consistent snapshot. Downloads read the entry and
//! are disabled (return `None`) until the first successful generation.
//!
//! `SessionRegistry` keeps one independent cache per session for hosts that
//! serve several users from one process. Nothing is persisted.

use crate::export::{ExportError, ExportedTables, TableExporter};
use crate::graph::{AssembledGraph, GraphDocument};
use crate::pipeline::Generation;
use crate::render::RenderedGraph;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Identifier of one user session
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A new random id (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One cached generation.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub documents: Vec<GraphDocument>,
    pub graph: AssembledGraph,
    pub artifact: RenderedGraph,
    pub generated_at: DateTime<Utc>,
    /// 1 for the first successful generation in the session, then increasing
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    id: SessionId,
    created_at: DateTime<Utc>,
    entry: Option<Arc<CacheEntry>>,
    generations: u64,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            entry: None,
            generations: 0,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The current entry, if any generation has succeeded.
    pub fn current(&self) -> Option<Arc<CacheEntry>> {
        self.entry.clone()
    }

    /// Whether downloads are enabled.
    pub fn is_ready(&self) -> bool {
        self.entry.is_some()
    }

    pub fn artifact(&self) -> Option<&RenderedGraph> {
        self.entry.as_deref().map(|e| &e.artifact)
    }

    /// Replace the entry with a new successful generation.
    pub fn store(&mut self, generation: Generation) -> Arc<CacheEntry> {
        self.generations += 1;
        let entry = Arc::new(CacheEntry {
            documents: generation.documents,
            graph: generation.graph,
            artifact: generation.artifact,
            generated_at: Utc::now(),
            generation: self.generations,
        });
        info!(
            session = %self.id,
            generation = entry.generation,
            nodes = entry.graph.node_count(),
            edges = entry.graph.edge_count(),
            "session cache updated"
        );
        self.entry = Some(Arc::clone(&entry));
        entry
    }

    /// Drop the cached entry. The generation counter keeps counting.
    pub fn clear(&mut self) {
        if self.entry.take().is_some() {
            debug!(session = %self.id, "session cache cleared");
        }
    }

    /// Export the cached graph; `None` when nothing has been generated yet.
    ///
    /// Reads only the cache, so repeated downloads never re-run extraction.
    pub fn export(&self, exporter: &TableExporter) -> Result<Option<ExportedTables>, ExportError> {
        match &self.entry {
            Some(entry) => exporter.export(&entry.graph).map(Some),
            None => {
                debug!(session = %self.id, "export requested before any generation");
                Ok(None)
            }
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Independent session caches keyed by `SessionId`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionCache>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Start a new empty session.
    pub fn open(&self) -> SessionId {
        let cache = SessionCache::new();
        let id = cache.id().clone();
        self.sessions.insert(id.clone(), cache);
        debug!(session = %id, "session opened");
        id
    }

    /// End a session and drop its cache.
    pub fn close(&self, id: &SessionId) -> Result<(), SessionError> {
        match self.sessions.remove(id) {
            Some(_) => {
                debug!(session = %id, "session closed");
                Ok(())
            }
            None => Err(SessionError::NotFound(id.clone())),
        }
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session ids, oldest first.
    pub fn list(&self) -> Vec<SessionId> {
        let mut sessions: Vec<(DateTime<Utc>, SessionId)> = self
            .sessions
            .iter()
            .map(|r| (r.value().created_at(), r.key().clone()))
            .collect();
        sessions.sort();
        sessions.into_iter().map(|(_, id)| id).collect()
    }

    pub fn store(&self, id: &SessionId, generation: Generation) -> Result<Arc<CacheEntry>, SessionError> {
        let mut cache = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        Ok(cache.store(generation))
    }

    pub fn current(&self, id: &SessionId) -> Result<Option<Arc<CacheEntry>>, SessionError> {
        self.sessions
            .get(id)
            .map(|cache| cache.current())
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub fn export(
        &self,
        id: &SessionId,
        exporter: &TableExporter,
    ) -> Result<Option<ExportedTables>, SessionError> {
        let cache = self
            .sessions
            .get(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        Ok(cache.export(exporter)?)
    }
}
