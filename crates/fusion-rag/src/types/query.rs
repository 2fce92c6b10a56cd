//! Query option types

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;

/// Options for a fused (multi-query) retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuseOptions {
    /// Number of document chunks to return
    pub k: usize,
    /// Queries to fuse, original included
    pub num_queries: usize,
    /// Append web snippets after the document chunks
    pub include_web: bool,
    /// Maximum number of web snippets
    pub web_result_count: usize,
}

impl FuseOptions {
    /// Options taken from the retrieval configuration, web search off
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            k: config.default_k,
            num_queries: config.num_queries,
            include_web: false,
            web_result_count: config.web_result_count,
        }
    }

    /// Set `k`
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Enable or disable web snippets
    pub fn with_web(mut self, include_web: bool) -> Self {
        self.include_web = include_web;
        self
    }

    /// Depth of each per-query ranking: wider than `k` so fusion has material
    pub fn ranking_depth(&self) -> usize {
        self.k.saturating_mul(3).max(10)
    }
}

impl Default for FuseOptions {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

/// How `answer` gathers its context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Single-query search for `k` chunks
    Search { k: usize },
    /// Multi-query fusion
    Fuse(FuseOptions),
}

/// Options for answer generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOptions {
    /// Context retrieval mode
    pub retrieval: RetrievalMode,
    /// Chat model override; the configured answer model is used when unset
    #[serde(default)]
    pub model: Option<String>,
}

impl AnswerOptions {
    /// Plain search with `k` chunks
    pub fn search(k: usize) -> Self {
        Self {
            retrieval: RetrievalMode::Search { k },
            model: None,
        }
    }

    /// Fused retrieval
    pub fn fuse(options: FuseOptions) -> Self {
        Self {
            retrieval: RetrievalMode::Fuse(options),
            model: None,
        }
    }
}
