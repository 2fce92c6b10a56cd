//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// OpenAI-compatible embedding and chat configuration
    pub openai: OpenAiConfig,
    /// Web search configuration
    pub web_search: WebSearchConfig,
    /// Retrieval and fusion configuration
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply environment overrides.
    ///
    /// Recognised variables: `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `TAVILY_API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.openai.base_url = url;
        }
        if let Some(key) = non_empty("TAVILY_API_KEY") {
            self.web_search.api_key = Some(key);
        }
    }

    /// Reject invalid settings
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.retrieval.rrf_constant < 0.0 || !self.retrieval.rrf_constant.is_finite() {
            return Err(Error::config(format!(
                "rrf_constant must be a finite non-negative number, got {}",
                self.retrieval.rrf_constant
            )));
        }
        if self.retrieval.ingest_concurrency == 0 {
            return Err(Error::config("ingest_concurrency must be at least 1"));
        }
        let timeouts = [
            self.openai.timeout_secs,
            self.web_search.timeout_secs,
            self.retrieval.expansion_timeout_secs,
            self.retrieval.embedding_timeout_secs,
            self.retrieval.extraction_timeout_secs,
        ];
        if timeouts.contains(&0) {
            return Err(Error::config("timeouts must be at least one second"));
        }
        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window size in characters
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Check `chunk_size > 0` and `chunk_overlap < chunk_size`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// OpenAI-compatible API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API base URL (including the `/v1` segment)
    pub base_url: String,
    /// API key, usually supplied through `OPENAI_API_KEY`
    pub api_key: Option<String>,
    /// Embedding model name
    pub embedding_model: String,
    /// Fixed embedding dimensions (taken from the first vector when unset)
    pub dimensions: Option<usize>,
    /// Model used for query expansion
    pub chat_model: String,
    /// Model used for answer generation
    pub answer_model: String,
    /// Sampling temperature for answers
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl OpenAiConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pause before the retry that follows failed attempt `attempt` (0-based)
    pub fn backoff_delay(attempt: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(attempt))
    }

    /// Worst-case wall time of one request: every attempt times out and
    /// every backoff pause is taken
    pub fn request_budget(&self) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        let backoff = (0..self.max_retries)
            .map(Self::backoff_delay)
            .fold(Duration::ZERO, Duration::saturating_add);
        self.timeout()
            .saturating_mul(attempts)
            .saturating_add(backoff)
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            embedding_model: "text-embedding-3-small".to_string(),
            dimensions: None,
            chat_model: "gpt-4o-mini".to_string(),
            answer_model: "gpt-4.1-mini".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    /// Use web search when a key is available
    pub enabled: bool,
    /// Tavily API base URL
    pub base_url: String,
    /// API key, usually supplied through `TAVILY_API_KEY`
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl WebSearchConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.tavily.com".to_string(),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

/// Retrieval and fusion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks returned when the caller does not say otherwise
    pub default_k: usize,
    /// Queries (original included) used for fusion
    pub num_queries: usize,
    /// Web snippets appended when web search is requested
    pub web_result_count: usize,
    /// RRF smoothing constant
    pub rrf_constant: f64,
    /// Time budget for query expansion in seconds
    pub expansion_timeout_secs: u64,
    /// Time budget for one embedding call (retries included) in seconds
    pub embedding_timeout_secs: u64,
    /// Time budget for extracting text from uploaded bytes in seconds
    pub extraction_timeout_secs: u64,
    /// Documents ingested concurrently by `ingest_many`
    pub ingest_concurrency: usize,
}

impl RetrievalConfig {
    /// Expansion timeout as a duration
    pub fn expansion_timeout(&self) -> Duration {
        Duration::from_secs(self.expansion_timeout_secs)
    }

    /// Embedding timeout as a duration
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    /// Extraction timeout as a duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_k: 3,
            num_queries: 3,
            web_result_count: 3,
            rrf_constant: 60.0,
            expansion_timeout_secs: 30,
            embedding_timeout_secs: 120,
            extraction_timeout_secs: 60,
            ingest_concurrency: 4,
        }
    }
}
