//! Retrieval core: vector store, single-query search, query expansion and rank fusion

pub mod expansion;
pub mod fusion;
pub mod search;
pub mod vector_store;

pub use expansion::QueryExpander;
pub use fusion::{reciprocal_rank_fusion, FusionEngine, DEFAULT_RRF_CONSTANT};
pub use search::{Corpus, RetrievalService};
pub use vector_store::{cosine_similarity, VectorStore};

use std::future::Future;
use std::time::Duration;

use crate::config::RagConfig;
use crate::error::{Error, Result};

/// Time budgets for every external call the core makes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// One embedding request, single or batched
    pub embedding: Duration,
    /// Text extraction from a byte payload
    pub extraction: Duration,
    /// One query expansion chat request
    pub expansion: Duration,
    /// One web search request
    pub web_search: Duration,
}

impl Timeouts {
    /// Timeouts taken from config
    pub fn from_config(config: &RagConfig) -> Self {
        Self {
            embedding: config.retrieval.embedding_timeout(),
            extraction: config.retrieval.extraction_timeout(),
            expansion: config.retrieval.expansion_timeout(),
            web_search: config.web_search.timeout(),
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}

/// Await `future`, failing with [`Error::Timeout`] once `limit` elapses
pub(crate) async fn bounded<T, F>(operation: &'static str, limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout { operation, limit }),
    }
}
