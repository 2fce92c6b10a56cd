//! Reciprocal Rank Fusion over expanded queries, with optional web snippets

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::providers::WebSearchProvider;
use crate::types::{ChunkKey, FuseOptions};

use super::bounded;
use super::expansion::QueryExpander;
use super::search::RetrievalService;

/// Conventional RRF constant
pub const DEFAULT_RRF_CONSTANT: f64 = 60.0;

/// Fuse several rankings into one.
///
/// RRF formula: score(d) = Σ 1 / (c + rank_i(d)), rank 1-based.
///
/// Returns (key, fused_score) sorted by score descending. Equal scores keep
/// the order in which keys were first seen, scanning ranking 0 top to bottom,
/// then ranking 1, and so on.
pub fn reciprocal_rank_fusion<K>(rankings: &[Vec<K>], c: f64) -> Vec<(K, f64)>
where
    K: Clone + Eq + Hash,
{
    let mut slots: HashMap<&K, usize> = HashMap::new();
    let mut fused: Vec<(K, f64)> = Vec::new();

    for ranking in rankings {
        for (rank, key) in ranking.iter().enumerate() {
            let contribution = 1.0 / (c + rank as f64 + 1.0);
            match slots.get(key) {
                Some(&slot) => fused[slot].1 += contribution,
                None => {
                    slots.insert(key, fused.len());
                    fused.push((key.clone(), contribution));
                }
            }
        }
    }

    // Stable sort keeps first-seen order for ties
    fused.sort_by(|a, b| b.1.total_cmp(&a.1));
    fused
}

/// Multi-query retrieval: expand, rank per query, fuse, resolve
pub struct FusionEngine {
    retrieval: Arc<RetrievalService>,
    expander: QueryExpander,
    web_search: Arc<dyn WebSearchProvider>,
    rrf_constant: f64,
    web_timeout: Duration,
}

impl FusionEngine {
    /// Engine over `retrieval`'s corpus; `web_timeout` bounds each web search call
    pub fn new(
        retrieval: Arc<RetrievalService>,
        expander: QueryExpander,
        web_search: Arc<dyn WebSearchProvider>,
        rrf_constant: f64,
        web_timeout: Duration,
    ) -> Self {
        Self {
            retrieval,
            expander,
            web_search,
            rrf_constant,
            web_timeout,
        }
    }

    /// Fused document chunks for `query`, followed by web snippets when requested.
    ///
    /// Expansion and web search failures degrade silently; only an embedding
    /// failure for every query is an error.
    pub async fn fuse(&self, query: &str, options: &FuseOptions) -> Result<Vec<String>> {
        let (documents, snippets) = tokio::join!(
            self.fused_documents(query, options),
            self.web_snippets(query, options)
        );

        let mut context = documents?;
        context.extend(snippets);
        Ok(context)
    }

    async fn fused_documents(&self, query: &str, options: &FuseOptions) -> Result<Vec<String>> {
        if options.k == 0 || self.retrieval.corpus().read().vectors().is_empty() {
            return Ok(Vec::new());
        }

        let queries = self.expander.expand(query, options.num_queries).await;
        let depth = options.ranking_depth();

        let embeddings =
            futures::future::join_all(queries.iter().map(|q| self.retrieval.embed_query(q))).await;

        let mut rankings: Vec<Vec<ChunkKey>> = Vec::with_capacity(queries.len());
        let mut first_error = None;
        for (q, embedding) in queries.iter().zip(embeddings) {
            match embedding {
                Ok(embedding) => {
                    let ranking = self.retrieval.ranking_for(&embedding, depth)?;
                    tracing::debug!("Query '{}' ranked {} chunks", q, ranking.len());
                    rankings.push(ranking);
                }
                Err(e) => {
                    tracing::warn!("Skipping query '{}': {}", q, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if rankings.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let fused = reciprocal_rank_fusion(&rankings, self.rrf_constant);
        for (i, (key, score)) in fused.iter().take(options.k).enumerate() {
            tracing::debug!("Fused {}: score={:.5}, key={}", i + 1, score, key);
        }

        let top: Vec<ChunkKey> = fused.into_iter().take(options.k).map(|(key, _)| key).collect();
        Ok(self.retrieval.resolve(&top))
    }

    async fn web_snippets(&self, query: &str, options: &FuseOptions) -> Vec<String> {
        if !options.include_web || options.web_result_count == 0 {
            return Vec::new();
        }
        if !self.web_search.is_enabled() {
            tracing::debug!("Web search requested but no provider is configured");
            return Vec::new();
        }

        let results = bounded(
            "Web search",
            self.web_timeout,
            self.web_search.search(query, options.web_result_count),
        )
        .await;

        match results {
            Ok(results) => results
                .iter()
                .filter(|r| !r.content.trim().is_empty())
                .take(options.web_result_count)
                .map(|r| r.to_snippet())
                .collect(),
            Err(e) => {
                tracing::warn!("Web search via {} failed: {}", self.web_search.name(), e);
                Vec::new()
            }
        }
    }
}
