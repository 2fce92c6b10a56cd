//! Provider abstractions for embeddings, chat, and web search
//!
//! The retrieval core only talks to these traits; the OpenAI and Tavily
//! clients are the default HTTP-backed implementations.

pub mod embedding;
pub mod llm;
pub mod openai;
pub mod tavily;
pub mod web_search;

pub use embedding::EmbeddingProvider;
pub use llm::{ChatMessage, ChatOptions, ChatProvider, Role};
pub use openai::{OpenAiChat, OpenAiClient, OpenAiEmbedder, OpenAiProvider};
pub use tavily::TavilySearch;
pub use web_search::{NoopWebSearch, WebSearchProvider, WebSearchResult};
