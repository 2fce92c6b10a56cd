//! Chat provider trait used for query expansion and answer generation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// System message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// User message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Per-call generation settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Model override; the provider default is used when unset
    pub model: Option<String>,
    /// Sampling temperature override
    pub temperature: Option<f32>,
}

/// Trait for chat completion
///
/// Implementations:
/// - `OpenAiChat`: OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Complete a conversation, returning the assistant text
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
