//! Result types returned by the pipeline

use serde::{Deserialize, Serialize};

/// Successful ingestion summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Document identifier
    pub document_id: String,
    /// Number of chunks embedded and stored
    pub chunks_created: usize,
    /// Characters in the extracted text
    pub total_characters: usize,
}

/// Snapshot of pipeline contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Number of ingested documents
    pub document_count: usize,
    /// Chunks across all documents
    pub total_chunks: usize,
    /// Vectors in the store
    pub vector_count: usize,
    /// Loaded document ids, sorted
    pub documents: Vec<String>,
}

/// Outcome of answer generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The model answered using the retrieved context
    Answered {
        /// Generated answer
        answer: String,
        /// Context handed to the model, in order
        context: Vec<String>,
    },
    /// Nothing relevant was retrieved; no model call was made
    NoRelevantContent,
}

impl AnswerOutcome {
    /// Answer text, if any
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Answered { answer, .. } => Some(answer),
            Self::NoRelevantContent => None,
        }
    }
}
