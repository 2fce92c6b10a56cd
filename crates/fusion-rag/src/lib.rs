//! fusion-rag: in-memory retrieval core for RAG applications
//!
//! Documents are split into overlapping character windows, embedded through an
//! [`providers::EmbeddingProvider`], and kept in a cosine-similarity vector
//! store. Queries are answered either by plain top-k search or by expanding
//! the query into several phrasings and fusing their rankings with
//! Reciprocal Rank Fusion, optionally followed by web search snippets.
//!
//! ```no_run
//! use fusion_rag::{FuseOptions, RagConfig, RagPipeline};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let pipeline = RagPipeline::from_config(RagConfig::load(None)?)?;
//! pipeline.ingest("notes", "Reciprocal rank fusion merges rankings.").await?;
//! let context = pipeline.fuse("what is rrf?", &FuseOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, IngestError, Result};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use types::{
    AnswerOptions, AnswerOutcome, ChunkKey, DocumentContent, FuseOptions, IngestReport,
    PipelineStats, RetrievalMode,
};
