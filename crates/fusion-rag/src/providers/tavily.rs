//! Tavily web search client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::WebSearchConfig;
use crate::error::{Error, Result};

use super::web_search::{WebSearchProvider, WebSearchResult};

/// Web search through the Tavily API
pub struct TavilySearch {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WebSearchResult>,
}

impl TavilySearch {
    /// Create a client; returns `None` when search is disabled or no key is set
    pub fn from_config(config: &WebSearchConfig) -> Result<Option<Self>> {
        let api_key = match config.api_key.as_deref().map(str::trim) {
            Some(key) if config.enabled && !key.is_empty() => key.to_string(),
            _ => return Ok(None),
        };

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        }))
    }
}

#[async_trait]
impl WebSearchProvider for TavilySearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebSearchResult>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::web_search(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::web_search(format!(
                "Search failed: HTTP {}",
                response.status()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::web_search(format!("Failed to parse search response: {}", e)))?;

        let mut results = parsed.results;
        results.truncate(max_results);
        Ok(results)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
