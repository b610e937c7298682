//! Deterministic extractor for integration tests
//!
//! Stands in for a model without network calls. Each sentence of the form
//! `Subject verb Object.` becomes two nodes and one relationship; capitalized
//! subjects and objects are typed `Entity`, everything else `Concept`. The
//! verb (and any following lowercase words before the object) becomes the
//! relation type in `UPPER_SNAKE_CASE`.

use async_trait::async_trait;
use textgraph::extract::require_text;
use textgraph::{Edge, ExtractionError, Extractor, GraphDocument, Node};

#[derive(Debug, Default)]
pub struct SentenceExtractor;

impl SentenceExtractor {
    pub fn new() -> Self {
        Self
    }

    fn node_type(name: &str) -> &'static str {
        if name.chars().next().map_or(false, char::is_uppercase) {
            "Entity"
        } else {
            "Concept"
        }
    }

    fn parse_sentence(sentence: &str, doc: &mut GraphDocument) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if words.len() < 3 {
            return;
        }
        let subject = words[0];
        let object = words[words.len() - 1];
        let relation = words[1..words.len() - 1].join("_").to_uppercase();

        doc.nodes.push(Node::new(subject, Self::node_type(subject)));
        doc.nodes.push(Node::new(object, Self::node_type(object)));
        doc.relationships.push(Edge::new(subject, object, relation));
    }
}

#[async_trait]
impl Extractor for SentenceExtractor {
    fn id(&self) -> &str {
        "sentence"
    }

    async fn extract(&self, text: &str) -> Result<Vec<GraphDocument>, ExtractionError> {
        let text = require_text(text)?;
        let mut doc = GraphDocument::new();
        for sentence in text.split(|c: char| matches!(c, '.' | '!' | '?')) {
            Self::parse_sentence(sentence.trim(), &mut doc);
        }
        Ok(vec![doc])
    }
}
