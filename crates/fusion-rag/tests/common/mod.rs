//! In-process collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fusion_rag::error::{Error, Result};
use fusion_rag::providers::{
    ChatMessage, ChatOptions, ChatProvider, EmbeddingProvider, WebSearchProvider, WebSearchResult,
};
use fusion_rag::{RagConfig, RagPipeline};

pub const DIMS: usize = 64;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket
pub struct HashEmbedder {
    pub calls: AtomicUsize,
    /// Fail any batch containing a text with this marker
    pub fail_marker: Option<String>,
    /// Sleep before answering
    pub delay: Option<Duration>,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_marker: None,
            delay: None,
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::new()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; DIMS];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        // FNV-1a
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in word.to_lowercase().bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        vector[(hash % DIMS as u64) as usize] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(Error::embedding("rate limited"));
            }
        }
        Ok(bag_of_words(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(marker) = &self.fail_marker {
            if texts.iter().any(|t| t.contains(marker.as_str())) {
                return Err(Error::embedding("rate limited"));
            }
        }
        Ok(texts.iter().map(|t| bag_of_words(t)).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(DIMS)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Returns one vector too few for any batch
pub struct ShortBatchEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortBatchEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(bag_of_words(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|t| bag_of_words(t)).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(DIMS)
    }

    fn name(&self) -> &str {
        "short-batch"
    }
}

/// Chat double: expansion requests get `expansion`, answer requests get `answer`
pub struct ScriptedChat {
    pub expansion: Option<String>,
    pub answer: String,
    pub requests: Mutex<Vec<(Vec<ChatMessage>, ChatOptions)>>,
    /// Sleep before answering an answer request
    pub answer_delay: Option<Duration>,
}

impl ScriptedChat {
    pub fn new(expansion: &str, answer: &str) -> Self {
        Self {
            expansion: Some(expansion.to_string()),
            answer: answer.to_string(),
            requests: Mutex::new(Vec::new()),
            answer_delay: None,
        }
    }

    /// Expansion requests fail; answers still work
    pub fn without_expansion(answer: &str) -> Self {
        Self {
            expansion: None,
            answer: answer.to_string(),
            requests: Mutex::new(Vec::new()),
            answer_delay: None,
        }
    }

    pub fn answer_requests(&self) -> Vec<(Vec<ChatMessage>, ChatOptions)> {
        self.requests
            .lock()
            .iter()
            .filter(|(messages, _)| is_answer_request(messages))
            .cloned()
            .collect()
    }
}

fn is_answer_request(messages: &[ChatMessage]) -> bool {
    messages.iter().any(|m| m.content.contains("Context:"))
}

#[async_trait]
impl ChatProvider for ScriptedChat {
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String> {
        self.requests.lock().push((messages.to_vec(), options.clone()));
        if is_answer_request(messages) {
            if let Some(delay) = self.answer_delay {
                tokio::time::sleep(delay).await;
            }
            return Ok(self.answer.clone());
        }
        self.expansion
            .clone()
            .ok_or_else(|| Error::llm("model overloaded"))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Web search double with canned results or a canned failure
pub struct FakeWebSearch {
    pub results: Vec<WebSearchResult>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl FakeWebSearch {
    pub fn with_results(results: Vec<WebSearchResult>) -> Self {
        Self {
            results,
            fail: false,
            delay: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            results: Vec::new(),
            fail: true,
            delay: None,
        }
    }
}

pub fn web_result(title: &str, content: &str) -> WebSearchResult {
    WebSearchResult {
        title: title.to_string(),
        content: content.to_string(),
        url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
    }
}

#[async_trait]
impl WebSearchProvider for FakeWebSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<WebSearchResult>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(Error::web_search("HTTP 502"));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "fake-web"
    }
}

/// Config with small chunks so short test documents still split
pub fn test_config() -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size = 120;
    config.chunking.chunk_overlap = 20;
    config
}

pub fn pipeline_with(
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatProvider>,
) -> RagPipeline {
    RagPipeline::builder(test_config())
        .embedder(embedder)
        .chat(chat)
        .build()
        .expect("test pipeline builds")
}

pub const RUST_DOC: &str = "Rust ownership rules: every value has a single owner. \
The borrow checker enforces that references never outlive the owner and that \
mutable borrows are exclusive.";

pub const PASTA_DOC: &str = "Cooking pasta: boil salted water, add the pasta, \
stir often and drain when al dente. Toss with tomato sauce and basil.";

pub const FUSION_DOC: &str = "Reciprocal rank fusion merges several rankings by \
summing one over sixty plus rank for every list a result appears in.";
