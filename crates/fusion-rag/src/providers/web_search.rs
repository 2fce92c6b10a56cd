//! Web search provider trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single web search hit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchResult {
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Extracted page text used as context
    #[serde(default)]
    pub content: String,
    /// Source address
    #[serde(default)]
    pub url: String,
}

impl WebSearchResult {
    /// Context snippet in the form `"Title: {title}\n{content}"`
    pub fn to_snippet(&self) -> String {
        format!("Title: {}\n{}", self.title, self.content)
    }
}

/// Trait for web search
///
/// Implementations:
/// - `TavilySearch`: Tavily search API
/// - `NoopWebSearch`: always returns no results
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Search the web for `query`, returning at most `max_results` hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebSearchResult>>;

    /// Whether this provider can return anything at all
    fn is_enabled(&self) -> bool {
        true
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Web search stand-in used when no search backend is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWebSearch;

#[async_trait]
impl WebSearchProvider for NoopWebSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<WebSearchResult>> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "noop"
    }
}
