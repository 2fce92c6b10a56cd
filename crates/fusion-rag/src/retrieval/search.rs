//! Document corpus and single-query retrieval

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, IngestError, Result};
use crate::ingestion::{TextChunker, TextExtractor};
use crate::providers::EmbeddingProvider;
use crate::types::{ChunkKey, DocumentContent, DocumentRecord, IngestReport, PipelineStats};

use super::vector_store::VectorStore;
use super::{bounded, Timeouts};

/// Document records and their vectors.
///
/// Both halves are only ever mutated together, so every vector key resolves
/// to a chunk of a stored document.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Document id -> record
    documents: BTreeMap<String, DocumentRecord>,
    /// Chunk key -> embedding
    vectors: VectorStore<ChunkKey>,
}

impl Corpus {
    /// Empty corpus with an optional fixed vector dimension
    pub fn new(dimensions: Option<usize>) -> Self {
        Self {
            documents: BTreeMap::new(),
            vectors: dimensions.map(VectorStore::with_dimensions).unwrap_or_default(),
        }
    }

    /// Vector store (read only)
    pub fn vectors(&self) -> &VectorStore<ChunkKey> {
        &self.vectors
    }

    /// Stored document record
    pub fn document(&self, id: &str) -> Option<&DocumentRecord> {
        self.documents.get(id)
    }

    /// Chunk text for `key`
    pub fn resolve(&self, key: &ChunkKey) -> Option<&str> {
        self.documents
            .get(&key.document_id)
            .and_then(|doc| doc.chunk(key.chunk_index))
    }

    /// Chunk texts for `keys` in order, skipping keys that do not resolve
    pub fn resolve_all<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a ChunkKey>,
    {
        keys.into_iter()
            .filter_map(|key| match self.resolve(key) {
                Some(text) => Some(text.to_string()),
                None => {
                    tracing::warn!("Chunk key {} has no matching chunk; skipping", key);
                    None
                }
            })
            .collect()
    }

    /// Replace `record` and its vectors in one step.
    ///
    /// The batch is validated before anything is touched, so on error the
    /// corpus is unchanged.
    pub fn commit(
        &mut self,
        record: DocumentRecord,
        embeddings: Vec<Vec<f32>>,
    ) -> std::result::Result<(), IngestError> {
        let entries: Vec<(ChunkKey, Vec<f32>)> = record.chunk_keys().zip(embeddings).collect();

        self.vectors
            .check_batch(&entries)
            .map_err(|e| IngestError::Store(e.to_string()))?;

        let id = record.id.clone();
        self.vectors.delete_where(|key| key.document_id == id);
        self.vectors
            .insert_batch(entries)
            .map_err(|e| IngestError::Store(e.to_string()))?;
        self.documents.insert(id, record);
        Ok(())
    }

    /// Remove one document and its vectors
    pub fn remove(&mut self, id: &str) -> Option<DocumentRecord> {
        let record = self.documents.remove(id)?;
        self.vectors.delete_where(|key| key.document_id == id);
        Some(record)
    }

    /// Drop every document and vector
    pub fn clear(&mut self) {
        self.documents.clear();
        self.vectors.delete_all();
    }

    /// Counts and loaded document ids
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            document_count: self.documents.len(),
            total_chunks: self.documents.values().map(|d| d.chunks.len()).sum(),
            vector_count: self.vectors.len(),
            documents: self.documents.keys().cloned().collect(),
        }
    }
}

/// Ingests documents and answers single-query searches over a shared corpus
pub struct RetrievalService {
    /// Corpus shared with the fusion engine
    corpus: Arc<RwLock<Corpus>>,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn TextExtractor>,
    timeouts: Timeouts,
}

impl RetrievalService {
    /// Create a new retrieval service with an empty corpus
    pub fn new(
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        extractor: Arc<dyn TextExtractor>,
        timeouts: Timeouts,
    ) -> Self {
        let corpus = Corpus::new(embedder.dimensions());
        Self {
            corpus: Arc::new(RwLock::new(corpus)),
            chunker,
            embedder,
            extractor,
            timeouts,
        }
    }

    /// Shared corpus handle
    pub fn corpus(&self) -> &Arc<RwLock<Corpus>> {
        &self.corpus
    }

    /// Configured timeouts
    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// Extract, chunk, embed and commit one document.
    ///
    /// The chunk batch is embedded before the corpus lock is taken. If embedding
    /// fails, or the future is dropped before it finishes, nothing is stored.
    pub async fn add_document(
        &self,
        id: &str,
        content: DocumentContent,
    ) -> std::result::Result<IngestReport, IngestError> {
        let text = match content {
            DocumentContent::Text(text) => text,
            DocumentContent::Bytes(bytes) => bounded(
                "Text extraction",
                self.timeouts.extraction,
                self.extractor.extract_text(&bytes),
            )
            .await
            .map_err(|e| match e {
                Error::Timeout { .. } => IngestError::from(e),
                other => IngestError::Extraction(other.to_string()),
            })?,
        };

        if text.trim().is_empty() {
            return Err(IngestError::NoExtractableText);
        }

        let chunks = self.chunker.split(&text);
        tracing::debug!("Embedding {} chunks for '{}'", chunks.len(), id);

        let embeddings = bounded(
            "Chunk embedding",
            self.timeouts.embedding,
            self.embedder.embed_batch(&chunks),
        )
        .await?;

        if embeddings.len() != chunks.len() {
            return Err(IngestError::EmbeddingCount {
                expected: chunks.len(),
                actual: embeddings.len(),
            });
        }

        let record = DocumentRecord::new(id, text, chunks);
        let report = IngestReport {
            document_id: record.id.clone(),
            chunks_created: record.chunks.len(),
            total_characters: record.total_characters(),
        };

        self.corpus.write().commit(record, embeddings)?;

        tracing::info!(
            "Ingested '{}': {} chunks, {} characters",
            report.document_id,
            report.chunks_created,
            report.total_characters
        );
        Ok(report)
    }

    /// Embed a query within the embedding time budget
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        bounded("Query embedding", self.timeouts.embedding, self.embedder.embed(query)).await
    }

    /// Ranking of chunk keys for an already embedded query
    pub fn ranking_for(&self, embedding: &[f32], depth: usize) -> Result<Vec<ChunkKey>> {
        let corpus = self.corpus.read();
        Ok(corpus
            .vectors
            .search(embedding, depth)?
            .into_iter()
            .map(|(key, _)| key)
            .collect())
    }

    /// Top `k` chunk texts for `query`.
    ///
    /// `min(2k, store size)` candidates are scored, leaving headroom for
    /// re-ranking; keys that do not resolve to a chunk are skipped.
    pub async fn search_documents(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let search_k = k.saturating_mul(2).min(self.corpus.read().vectors.len());
        if k == 0 || search_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embed_query(query).await?;

        let corpus = self.corpus.read();
        let results = corpus.vectors.search(&embedding, search_k)?;

        for (i, (key, score)) in results.iter().take(k).enumerate() {
            tracing::debug!("Result {}: score={:.4}, key={}", i + 1, score, key);
        }

        Ok(corpus.resolve_all(results.iter().take(k).map(|(key, _)| key)))
    }

    /// Chunk texts for `keys`, skipping unresolvable ones
    pub fn resolve(&self, keys: &[ChunkKey]) -> Vec<String> {
        self.corpus.read().resolve_all(keys)
    }

    /// Stored document record
    pub fn document(&self, id: &str) -> Option<DocumentRecord> {
        self.corpus.read().document(id).cloned()
    }

    /// Remove one document and its vectors
    pub fn remove_document(&self, id: &str) -> bool {
        self.corpus.write().remove(id).is_some()
    }

    /// Counts and loaded document ids
    pub fn stats(&self) -> PipelineStats {
        self.corpus.read().stats()
    }

    /// Drop every document and vector
    pub fn clear(&self) {
        self.corpus.write().clear();
        tracing::info!("Cleared all documents and vectors");
    }
}
