//! Query expansion through the chat collaborator

use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::generation::PromptBuilder;
use crate::providers::{ChatOptions, ChatProvider};

use super::bounded;

/// Leading bullet (`-`, `*`, `•`) or numbering (`1.`, `2)`) on a model output line
fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*•]+|\d+[.)])\s*").expect("valid list marker pattern")
    })
}

/// Generates alternative phrasings of a query
pub struct QueryExpander {
    chat: Arc<dyn ChatProvider>,
    timeout: Duration,
    options: ChatOptions,
}

impl QueryExpander {
    /// Create an expander with the provider's default model
    pub fn new(chat: Arc<dyn ChatProvider>, timeout: Duration) -> Self {
        Self {
            chat,
            timeout,
            options: ChatOptions::default(),
        }
    }

    /// Use specific chat options for expansion requests
    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    /// Up to `num_queries` queries, the original always first.
    ///
    /// Never fails: on a collaborator error or timeout the result is `[query]`.
    pub async fn expand(&self, query: &str, num_queries: usize) -> Vec<String> {
        if num_queries <= 1 {
            return vec![query.to_string()];
        }

        let messages = PromptBuilder::expansion_messages(query, num_queries - 1);
        let raw = bounded(
            "Query expansion",
            self.timeout,
            self.chat.complete_chat(&messages, &self.options),
        )
        .await;

        match raw {
            Ok(raw) => {
                let queries = parse_reformulations(&raw, query, num_queries);
                tracing::debug!("Expanded '{}' into {} queries", query, queries.len());
                queries
            }
            Err(e) => {
                tracing::warn!(
                    "Query expansion via {} failed, using the original query only: {}",
                    self.chat.name(),
                    e
                );
                vec![query.to_string()]
            }
        }
    }
}

/// Turn raw model output into `[original, reformulations...]`, at most `limit` long.
///
/// Lines are stripped of list markers and quotes; empty lines, header lines
/// ending in `:`, and exact (case-sensitive) duplicates are dropped.
pub fn parse_reformulations(raw: &str, original: &str, limit: usize) -> Vec<String> {
    let mut queries = vec![original.to_string()];

    for line in raw.lines() {
        if queries.len() >= limit {
            break;
        }

        let stripped = list_marker().replace(line, "");
        let candidate = stripped
            .trim()
            .trim_matches(|c| c == '"' || c == '“' || c == '”')
            .trim();

        if candidate.is_empty() || candidate.ends_with(':') {
            continue;
        }
        if queries.iter().any(|q| q == candidate) {
            continue;
        }
        queries.push(candidate.to_string());
    }

    queries
}
