//! OpenAI-compatible providers for embeddings and chat
//!
//! Both providers share one `OpenAiClient`, which owns the HTTP client,
//! bearer auth and retry logic.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::sleep;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{ChatMessage, ChatOptions, ChatProvider};

/// OpenAI API client with automatic retry
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: OpenAiConfig,
    /// Bearer token
    api_key: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create a new client; fails if no API key is configured
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::config("OPENAI_API_KEY is not set"))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = OpenAiConfig::backoff_delay(attempt);
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.config.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal("Retry loop finished without a result")))
    }

    /// Embed a batch of texts, preserving input order
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let url = url.as_str();
        let this = self;

        self.retry_request(|| async move {
            let request = EmbeddingRequest {
                model: &this.config.embedding_model,
                input: texts,
                dimensions: this.config.dimensions,
            };

            let response = this
                .client
                .post(url)
                .bearer_auth(&this.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::embedding(format!(
                    "Embedding failed: HTTP {} - {}",
                    status, body
                )));
            }

            let mut parsed: EmbeddingResponse = response
                .json()
                .await
                .map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;

            if parsed.data.len() != texts.len() {
                return Err(Error::embedding(format!(
                    "Expected {} embeddings, got {}",
                    texts.len(),
                    parsed.data.len()
                )));
            }

            parsed.data.sort_by_key(|d| d.index);
            Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
        })
        .await
    }

    /// Run a chat completion and return the assistant text
    pub async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let model = options
            .model
            .as_deref()
            .unwrap_or(&self.config.chat_model);
        let temperature = options.temperature.unwrap_or(self.config.temperature);

        tracing::debug!("Chat completion with model: {}", model);

        let url = url.as_str();
        let this = self;

        self.retry_request(|| async move {
            let request = ChatRequest {
                model,
                messages,
                temperature,
            };

            let response = this
                .client
                .post(url)
                .bearer_auth(&this.api_key)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::llm(format!("Chat request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::llm(format!(
                    "Chat completion failed: HTTP {} - {}",
                    status, body
                )));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| Error::llm(format!("Failed to parse chat response: {}", e)))?;

            parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| Error::llm("Chat response contained no message content"))
        })
        .await
    }
}

/// OpenAI embedding provider
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
}

impl OpenAiEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.client.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::embedding("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.client.embed_batch(texts).await
    }

    fn dimensions(&self) -> Option<usize> {
        self.client.config().dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// OpenAI chat provider
pub struct OpenAiChat {
    client: Arc<OpenAiClient>,
}

impl OpenAiChat {
    /// Create from an existing client
    pub fn from_client(client: Arc<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatProvider for OpenAiChat {
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String> {
        self.client.complete_chat(messages, options).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Combined OpenAI provider that shares a single client for embeddings and chat
pub struct OpenAiProvider {
    embedder: OpenAiEmbedder,
    chat: OpenAiChat,
}

impl OpenAiProvider {
    /// Create a new combined provider
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(config)?);
        Ok(Self {
            embedder: OpenAiEmbedder::from_client(Arc::clone(&client)),
            chat: OpenAiChat::from_client(client),
        })
    }

    /// Split into separate providers
    pub fn split(self) -> (OpenAiEmbedder, OpenAiChat) {
        (self.embedder, self.chat)
    }
}
