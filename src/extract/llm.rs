//! Chat-completions extractor: LLM-based entity and relationship extraction
//!
//! Sends each text chunk to an OpenAI-compatible `/chat/completions`
//! endpoint with a graph-extraction prompt, then parses the model's JSON
//! answer into a `GraphDocument`. One document is produced per chunk.
//!
//! The extractor:
//! 1. Splits the text into chunks (`chunk_size` characters)
//! 2. Invokes the model once per chunk, sequentially
//! 3. Locates the JSON object in the answer (bare, fenced, or embedded)
//! 4. Validates it against the graph document contract
//! 5. Normalizes relation types to `UPPER_SNAKE_CASE`

use super::chunk::chunk_text;
use super::{require_text, ExtractionError, Extractor};
use crate::config::ExtractionConfig;
use crate::graph::{GraphDocument, NodeId};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "\
You are a knowledge graph extraction system. Read the user's text and extract \
the entities it mentions and the relationships between them.

Return ONLY a JSON object of this shape:
{\"nodes\": [{\"id\": \"<entity name>\", \"type\": \"<entity type>\", \"properties\": {\"<key>\": \"<value>\"}}],
 \"relationships\": [{\"source\": \"<node id>\", \"target\": \"<node id>\", \"type\": \"<RELATION_TYPE>\", \"properties\": {}}]}

Rules:
- Use the most complete human-readable name as a node id and reuse it consistently.
- Node types are short capitalized nouns such as Person, Organization, Location, Concept.
- Relationship types are general and timeless, written in UPPER_SNAKE_CASE.
- Every relationship endpoint must be the id of a node you listed.
- Do not invent facts that are not in the text.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Locate the graph object in a model answer.
///
/// Candidates, in order: the whole answer, the first fenced block, the
/// outermost `{ ... }` span. A one-element array around an object counts as
/// that object.
fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let braced = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => Some(&trimmed[start..=end]),
        _ => None,
    };
    [Some(trimmed), fenced_block(trimmed), braced]
        .into_iter()
        .flatten()
        .find_map(|candidate| graph_object(candidate.trim()))
}

/// Body of the first ``` fence, skipping an info string such as `json`.
fn fenced_block(text: &str) -> Option<&str> {
    let after = &text[text.find("```")? + 3..];
    let body = &after[after.find('\n')? + 1..];
    body.find("```").map(|end| &body[..end])
}

fn graph_object(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate).ok()? {
        v @ Value::Object(_) => Some(v),
        Value::Array(mut items) if items.len() == 1 && items[0].is_object() => items.pop(),
        _ => None,
    }
}

/// `"works at"` / `"worksAt"` / `"works-at"` → `"WORKS_AT"`.
pub fn normalize_relation_type(raw: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in raw.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        // camelCase boundary
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase();
        current.extend(c.to_uppercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

/// Parse one model answer into a document.
fn parse_answer(answer: &str) -> Result<GraphDocument, ExtractionError> {
    let value = extract_json(answer).ok_or_else(|| {
        ExtractionError::MalformedResponse(truncate(answer, 200).to_string())
    })?;

    let mut doc = GraphDocument::from_value(&value)?;

    for node in &mut doc.nodes {
        node.id = NodeId::new(node.id.as_str().trim());
        node.node_type = node.node_type.trim().to_string();
    }
    for edge in &mut doc.relationships {
        edge.source = NodeId::new(edge.source.as_str().trim());
        edge.target = NodeId::new(edge.target.as_str().trim());
        edge.relationship = normalize_relation_type(&edge.relationship);
    }

    Ok(doc)
}

/// Extractor backed by an OpenAI-compatible chat-completions API.
pub struct ChatExtractor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    chunk_size: usize,
    allowed_node_types: Vec<String>,
    allowed_relationship_types: Vec<String>,
}

impl ChatExtractor {
    /// Build an extractor with an explicit API key.
    pub fn new(config: &ExtractionConfig, api_key: impl Into<String>) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExtractionError::Unavailable(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            chunk_size: config.chunk_size,
            allowed_node_types: config.allowed_node_types.clone(),
            allowed_relationship_types: config.allowed_relationship_types.clone(),
        })
    }

    /// Build an extractor reading the API key from `config.api_key_env`.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ExtractionError::Unavailable(format!("environment variable {} is not set", config.api_key_env))
            })?;
        Self::new(config, api_key)
    }

    fn system_prompt(&self) -> String {
        let mut prompt = SYSTEM_PROMPT.to_string();
        if !self.allowed_node_types.is_empty() {
            prompt.push_str(&format!(
                "\n- Only use these node types: {}.",
                self.allowed_node_types.join(", ")
            ));
        }
        if !self.allowed_relationship_types.is_empty() {
            prompt.push_str(&format!(
                "\n- Only use these relationship types: {}.",
                self.allowed_relationship_types.join(", ")
            ));
        }
        prompt
    }

    fn map_http_error(&self, error: reqwest::Error) -> ExtractionError {
        if error.is_timeout() {
            ExtractionError::Timeout(error.to_string())
        } else if error.is_connect() {
            ExtractionError::Upstream(format!("connection error: {}", error))
        } else {
            ExtractionError::Upstream(error.to_string())
        }
    }

    #[instrument(skip(self, chunk), fields(chars = chunk.chars().count()))]
    async fn extract_chunk(&self, chunk: &str) -> Result<GraphDocument, ExtractionError> {
        let url = format!("{}/chat/completions", self.endpoint);
        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": self.system_prompt() },
                { "role": "user", "content": chunk },
            ],
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_http_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Upstream(format!(
                "{} returned {}: {}",
                url,
                status,
                truncate(&detail, 200)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(format!("unexpected response body: {}", e)))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::MalformedResponse("response has no message content".to_string()))?;

        let doc = parse_answer(&answer)?;
        debug!(nodes = doc.nodes.len(), edges = doc.relationships.len(), "chunk extracted");
        Ok(doc)
    }
}

#[async_trait]
impl Extractor for ChatExtractor {
    fn id(&self) -> &str {
        "chat-completions"
    }

    async fn extract(&self, text: &str) -> Result<Vec<GraphDocument>, ExtractionError> {
        let text = require_text(text)?;
        let chunks = chunk_text(text, self.chunk_size);
        info!(model = %self.model, chunks = chunks.len(), "extracting graph from text");

        let mut documents = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            documents.push(self.extract_chunk(chunk).await?);
        }
        Ok(documents)
    }
}
