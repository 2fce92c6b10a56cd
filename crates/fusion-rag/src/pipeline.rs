//! Pipeline handle tying ingestion, retrieval, fusion and answering together

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, IngestError, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::{DefaultExtractor, TextChunker, TextExtractor};
use crate::providers::{
    ChatOptions, ChatProvider, EmbeddingProvider, NoopWebSearch, OpenAiProvider, TavilySearch,
    WebSearchProvider,
};
use crate::retrieval::{bounded, FusionEngine, QueryExpander, RetrievalService, Timeouts};
use crate::types::{
    AnswerOptions, AnswerOutcome, DocumentContent, FuseOptions, IngestReport, PipelineStats,
    RetrievalMode,
};

/// Handle to one corpus and its collaborators.
///
/// Cloning is cheap and every clone sees the same documents.
#[derive(Clone)]
pub struct RagPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    config: RagConfig,
    retrieval: Arc<RetrievalService>,
    fusion: FusionEngine,
    chat: Arc<dyn ChatProvider>,
}

/// Builder for [`RagPipeline`] with pluggable collaborators
pub struct RagPipelineBuilder {
    config: RagConfig,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    chat: Option<Arc<dyn ChatProvider>>,
    web_search: Option<Arc<dyn WebSearchProvider>>,
    extractor: Option<Arc<dyn TextExtractor>>,
}

impl RagPipelineBuilder {
    /// Embedding collaborator (required)
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Chat collaborator used for expansion and answers (required)
    pub fn chat(mut self, chat: Arc<dyn ChatProvider>) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Web search collaborator; defaults to [`NoopWebSearch`]
    pub fn web_search(mut self, web_search: Arc<dyn WebSearchProvider>) -> Self {
        self.web_search = Some(web_search);
        self
    }

    /// Text extractor for byte payloads; defaults to [`DefaultExtractor`]
    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Validate the configuration and assemble the pipeline
    pub fn build(self) -> Result<RagPipeline> {
        self.config.validate()?;

        let embedder = self
            .embedder
            .ok_or_else(|| Error::config("an embedding provider is required"))?;
        let chat = self
            .chat
            .ok_or_else(|| Error::config("a chat provider is required"))?;
        let web_search = self
            .web_search
            .unwrap_or_else(|| Arc::new(NoopWebSearch));
        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(DefaultExtractor::default()));

        let chunker = TextChunker::from_config(&self.config.chunking)?;
        let timeouts = Timeouts::from_config(&self.config);

        tracing::info!(
            "Building pipeline (embedder: {}, chat: {}, web search: {}, extractor: {})",
            embedder.name(),
            chat.name(),
            web_search.name(),
            extractor.name()
        );

        let retrieval = Arc::new(RetrievalService::new(chunker, embedder, extractor, timeouts));
        let expander =
            QueryExpander::new(chat.clone(), timeouts.expansion).with_options(ChatOptions {
                model: Some(self.config.openai.chat_model.clone()),
                temperature: None,
            });
        let fusion = FusionEngine::new(
            retrieval.clone(),
            expander,
            web_search,
            self.config.retrieval.rrf_constant,
            timeouts.web_search,
        );

        Ok(RagPipeline {
            inner: Arc::new(PipelineInner {
                config: self.config,
                retrieval,
                fusion,
                chat,
            }),
        })
    }
}

impl RagPipeline {
    /// Start building a pipeline with custom collaborators
    pub fn builder(config: RagConfig) -> RagPipelineBuilder {
        RagPipelineBuilder {
            config,
            embedder: None,
            chat: None,
            web_search: None,
            extractor: None,
        }
    }

    /// Pipeline backed by the OpenAI-compatible API and, when configured, Tavily.
    ///
    /// Fails with [`Error::Config`] when no OpenAI API key is set.
    pub fn from_config(config: RagConfig) -> Result<Self> {
        config.validate()?;

        let (embedder, chat) = OpenAiProvider::new(&config.openai)?.split();
        let tavily = TavilySearch::from_config(&config.web_search)?;
        let web_search: Arc<dyn WebSearchProvider> = match tavily {
            Some(tavily) => Arc::new(tavily),
            None => {
                tracing::info!("Web search disabled (no Tavily key or disabled in config)");
                Arc::new(NoopWebSearch)
            }
        };

        Self::builder(config)
            .embedder(Arc::new(embedder))
            .chat(Arc::new(chat))
            .web_search(web_search)
            .build()
    }

    /// Active configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Ingest one document, replacing any previous document with the same id
    pub async fn ingest(
        &self,
        id: &str,
        content: impl Into<DocumentContent>,
    ) -> std::result::Result<IngestReport, IngestError> {
        let result = self.inner.retrieval.add_document(id, content.into()).await;
        if let Err(e) = &result {
            tracing::warn!("Ingestion of '{}' failed: {}", id, e);
        }
        result
    }

    /// Ingest several documents with bounded concurrency.
    ///
    /// Results come back in input order; one failure never affects the others.
    pub async fn ingest_many<I>(
        &self,
        documents: I,
    ) -> Vec<(String, std::result::Result<IngestReport, IngestError>)>
    where
        I: IntoIterator<Item = (String, DocumentContent)>,
    {
        let concurrency = self.inner.config.retrieval.ingest_concurrency.max(1);

        stream::iter(documents)
            .map(|(id, content)| async move {
                let result = self.ingest(&id, content).await;
                (id, result)
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    /// Top `k` chunks for `query` by cosine similarity
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        self.inner.retrieval.search_documents(query, k).await
    }

    /// Fused multi-query retrieval, optionally followed by web snippets
    pub async fn fuse(&self, query: &str, options: &FuseOptions) -> Result<Vec<String>> {
        self.inner.fusion.fuse(query, options).await
    }

    /// Retrieve context and ask the chat collaborator to answer from it.
    ///
    /// Returns [`AnswerOutcome::NoRelevantContent`] without a model call when
    /// nothing was retrieved.
    pub async fn answer(&self, query: &str, options: &AnswerOptions) -> Result<AnswerOutcome> {
        let context = match &options.retrieval {
            RetrievalMode::Search { k } => self.search(query, *k).await?,
            RetrievalMode::Fuse(fuse) => self.fuse(query, fuse).await?,
        };

        if context.is_empty() {
            tracing::info!("No relevant content for '{}'", query);
            return Ok(AnswerOutcome::NoRelevantContent);
        }

        let openai = &self.inner.config.openai;
        let chat_options = ChatOptions {
            model: Some(options.model.clone().unwrap_or_else(|| openai.answer_model.clone())),
            temperature: Some(openai.temperature),
        };
        let messages = PromptBuilder::answer_messages(query, &context);
        
        let answer = bounded(
            "Answer generation",
            openai.request_budget(),
            self.inner.chat.complete_chat(&messages, &chat_options),
        )
        .await?;

        tracing::debug!("Answered '{}' from {} context chunks", query, context.len());
        Ok(AnswerOutcome::Answered { answer, context })
    }

    /// Counts and loaded document ids
    pub fn stats(&self) -> PipelineStats {
        self.inner.retrieval.stats()
    }

    /// Remove a single document
    pub fn remove(&self, id: &str) -> bool {
        self.inner.retrieval.remove_document(id)
    }

    /// Drop every document and vector
    pub fn clear(&self) {
        self.inner.retrieval.clear();
    }
}
