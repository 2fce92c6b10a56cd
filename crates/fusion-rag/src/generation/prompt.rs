//! Prompt templates for query expansion and answer generation

use crate::providers::ChatMessage;

const EXPANSION_SYSTEM: &str = "You rewrite search queries. Given a user question, produce \
alternative phrasings that keep the same meaning but vary wording, specificity and \
terminology so that a document search finds more relevant passages.";

const ANSWER_SYSTEM: &str = "You are a helpful assistant that answers questions based on the \
provided context. Use the information from the context to answer questions as best as you can. \
If the context contains relevant information, use it to provide a helpful answer. If the \
context doesn't contain enough information to fully answer the question, provide what \
information you can from the context and mention what additional information might be needed.";

/// Prompt builder for expansion and answer requests
pub struct PromptBuilder;

impl PromptBuilder {
    /// Messages asking for `count` reformulations of `query`, one per line
    pub fn expansion_messages(query: &str, count: usize) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(EXPANSION_SYSTEM),
            ChatMessage::user(format!(
                "Write {} alternative versions of the following question. \
                 Return one question per line with no numbering and no extra text.\n\n\
                 Question: {}",
                count, query
            )),
        ]
    }

    /// Join context chunks with blank lines
    pub fn build_context(chunks: &[String]) -> String {
        chunks.join("\n\n")
    }

    /// Messages asking the model to answer `query` from `chunks`
    pub fn answer_messages(query: &str, chunks: &[String]) -> Vec<ChatMessage> {
        let context = Self::build_context(chunks);
        vec![
            ChatMessage::system(ANSWER_SYSTEM),
            ChatMessage::user(format!(
                "Based on the following context, please answer this question:\n\n\
                 Context:\n{}\n\nQuestion: {}\n\nAnswer:",
                context, query
            )),
        ]
    }
}
