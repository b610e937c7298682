//! Configuration loaded from YAML, with environment overrides
//!
//! Lookup order: explicit path, then `<config_dir>/textgraph/config.yaml`,
//! then built-in defaults. `TEXTGRAPH_ENDPOINT` and `TEXTGRAPH_MODEL`
//! override the file.

use crate::graph::MergePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_ENDPOINT: &str = "TEXTGRAPH_ENDPOINT";
pub const ENV_MODEL: &str = "TEXTGRAPH_MODEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub assembly: AssemblyConfig,
    pub render: RenderConfig,
}

/// Settings for the chat-completions extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL of an OpenAI-compatible API
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Characters per extraction call
    pub chunk_size: usize,
    /// Prompt hints; empty means unrestricted
    pub allowed_node_types: Vec<String>,
    pub allowed_relationship_types: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
            chunk_size: 4000,
            allowed_node_types: Vec::new(),
            allowed_relationship_types: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub merge_policy: MergePolicy,
}

/// Settings for the HTML renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub height: String,
    pub width: String,
    /// Force-directed layout on/off
    pub physics: bool,
    pub vis_network_url: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            height: "1000px".to_string(),
            width: "100%".to_string(),
            physics: true,
            vis_network_url: "https://unpkg.com/vis-network@9.1.9/standalone/umd/vis-network.min.js"
                .to_string(),
        }
    }
}

impl Config {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// `<config_dir>/textgraph/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("textgraph").join("config.yaml"))
    }

    /// Resolve, apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment, in `load`).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            self.extraction.endpoint = endpoint;
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.extraction.model = model;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extraction.chunk_size == 0 {
            return Err(ConfigError::Invalid("extraction.chunk_size must be positive".into()));
        }
        if self.extraction.model.trim().is_empty() {
            return Err(ConfigError::Invalid("extraction.model must not be empty".into()));
        }
        if self.extraction.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("extraction.endpoint must not be empty".into()));
        }
        Ok(())
    }
}
