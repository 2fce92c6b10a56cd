//! Document ingestion: text extraction and chunking

mod chunker;
pub mod extract;

pub use chunker::TextChunker;
pub use extract::{DefaultExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
