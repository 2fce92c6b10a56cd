//! Error types for the RAG pipeline

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (invalid chunking, missing credentials, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Vector has a different dimension than the store
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Embedding provider error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Chat / LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Web search error
    #[error("Web search error: {0}")]
    WebSearch(String),

    /// Text extraction error
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// External call did not finish in time
    #[error("{operation} timed out after {limit:?}")]
    Timeout { operation: &'static str, limit: Duration },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a web search error
    pub fn web_search(message: impl Into<String>) -> Self {
        Self::WebSearch(message.into())
    }

    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

/// Per-document ingestion failure.
///
/// Returned as a value from ingestion so that "no text" and "embedding failed"
/// stay distinguishable and one bad document never aborts a batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Extracted text was empty or whitespace only
    #[error("No text could be extracted from the document")]
    NoExtractableText,

    /// Extractor failed on the raw bytes
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// Embedding provider failed for the chunk batch
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Provider returned the wrong number of vectors
    #[error("Embedding provider returned {actual} vectors for {expected} chunks")]
    EmbeddingCount { expected: usize, actual: usize },

    /// Extraction or embedding exceeded its time budget
    #[error("{operation} timed out after {limit:?}")]
    Timeout { operation: &'static str, limit: Duration },

    /// Vector store rejected the batch (nothing was committed)
    #[error("Vector store rejected the batch: {0}")]
    Store(String),
}

impl From<Error> for IngestError {
    fn from(err: Error) -> Self {
        match err {
            Error::Timeout { operation, limit } => Self::Timeout { operation, limit },
            Error::Extraction(msg) => Self::Extraction(msg),
            Error::DimensionMismatch { .. } => Self::Store(err.to_string()),
            other => Self::Embedding(other.to_string()),
        }
    }
}
