//! Core data types

pub mod document;
pub mod query;
pub mod response;

pub use document::{ChunkKey, DocumentContent, DocumentRecord};
pub use query::{AnswerOptions, FuseOptions, RetrievalMode};
pub use response::{AnswerOutcome, IngestReport, PipelineStats};
