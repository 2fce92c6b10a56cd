//! Prompt construction for the chat collaborator

pub mod prompt;

pub use prompt::PromptBuilder;
