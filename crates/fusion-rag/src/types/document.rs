//! Document and chunk key types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Separator used in the textual form of a [`ChunkKey`]
const CHUNK_SEPARATOR: &str = "__chunk_";

/// Identifies one chunk: the owning document and its zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    /// Document identifier (usually the filename)
    pub document_id: String,
    /// Zero-based chunk position within the document
    pub chunk_index: usize,
}

impl ChunkKey {
    /// Create a new chunk key
    pub fn new(document_id: impl Into<String>, chunk_index: usize) -> Self {
        Self {
            document_id: document_id.into(),
            chunk_index,
        }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.document_id, CHUNK_SEPARATOR, self.chunk_index)
    }
}

impl FromStr for ChunkKey {
    type Err = Error;

    /// Parse `"{document_id}__chunk_{index}"`, splitting on the last separator
    /// so document ids that contain the separator still round-trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (document_id, index) = s
            .rsplit_once(CHUNK_SEPARATOR)
            .ok_or_else(|| Error::internal(format!("Malformed chunk key: {}", s)))?;

        let chunk_index = index
            .parse::<usize>()
            .map_err(|e| Error::internal(format!("Malformed chunk index in '{}': {}", s, e)))?;

        Ok(Self::new(document_id, chunk_index))
    }
}

/// Raw document content handed to ingestion
#[derive(Debug, Clone)]
pub enum DocumentContent {
    /// Already extracted text
    Text(String),
    /// Bytes that go through the configured text extractor (e.g. a PDF)
    Bytes(Vec<u8>),
}

impl From<String> for DocumentContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for DocumentContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for DocumentContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// An ingested document with its chunk sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document identifier
    pub id: String,
    /// Full extracted text
    pub text: String,
    /// Ordered chunk texts; index `i` belongs to `ChunkKey(id, i)`
    pub chunks: Vec<String>,
    /// When the document was committed
    pub ingested_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a new record stamped with the current time
    pub fn new(id: impl Into<String>, text: String, chunks: Vec<String>) -> Self {
        Self {
            id: id.into(),
            text,
            chunks,
            ingested_at: Utc::now(),
        }
    }

    /// Chunk text at `index`, if present
    pub fn chunk(&self, index: usize) -> Option<&str> {
        self.chunks.get(index).map(String::as_str)
    }

    /// Keys for every chunk, in order
    pub fn chunk_keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        (0..self.chunks.len()).map(move |i| ChunkKey::new(self.id.clone(), i))
    }

    /// Number of characters in the full text
    pub fn total_characters(&self) -> usize {
        self.text.chars().count()
    }
}
