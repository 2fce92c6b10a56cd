//! In-memory vector store with exact cosine-similarity search
//!
//! Entries live in insertion order; search is a linear scan, which keeps
//! ranking deterministic (equal scores keep insertion order).

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::ChunkKey;

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ; the
/// result is clamped to [-1, 1] to absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(-1.0, 1.0)
    }
}

/// Keyed embedding vectors with a fixed dimension
#[derive(Debug, Clone)]
pub struct VectorStore<K = ChunkKey> {
    /// Entries in insertion order
    entries: Vec<(K, Vec<f32>)>,
    /// Key -> position in `entries`
    index: HashMap<K, usize>,
    /// Vector dimension, fixed by configuration or the first insert
    dimensions: Option<usize>,
}

impl<K> Default for VectorStore<K>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> VectorStore<K>
where
    K: Clone + Eq + Hash,
{
    /// Empty store; the dimension is taken from the first insert
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            dimensions: None,
        }
    }

    /// Empty store with a fixed dimension
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: Some(dimensions),
            ..Self::new()
        }
    }

    /// Vector dimension, once known
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` has a vector
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Vector stored for `key`
    pub fn get(&self, key: &K) -> Option<&[f32]> {
        self.index.get(key).map(|&pos| self.entries[pos].1.as_slice())
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn check_dimensions(&self, expected: Option<usize>, vector: &[f32]) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::config("Cannot store an empty vector"));
        }
        match expected {
            Some(expected) if expected != vector.len() => Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Store or overwrite the vector for `key`.
    ///
    /// Overwriting keeps the key's original position in insertion order.
    pub fn insert(&mut self, key: K, vector: Vec<f32>) -> Result<()> {
        self.check_dimensions(self.dimensions, &vector)?;
        self.dimensions.get_or_insert(vector.len());

        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = vector,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vector));
            }
        }
        Ok(())
    }

    /// Check that every vector in `entries` would be accepted by `insert`
    pub fn check_batch(&self, entries: &[(K, Vec<f32>)]) -> Result<()> {
        let expected = self
            .dimensions
            .or_else(|| entries.first().map(|(_, v)| v.len()));

        entries
            .iter()
            .try_for_each(|(_, vector)| self.check_dimensions(expected, vector))
    }

    /// Insert every entry or none of them
    pub fn insert_batch(&mut self, entries: Vec<(K, Vec<f32>)>) -> Result<()> {
        self.check_batch(&entries)?;

        for (key, vector) in entries {
            self.insert(key, vector)?;
        }
        Ok(())
    }

    /// Top `k` entries by cosine similarity to `query`, best first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(K, f32)>> {
        self.search_excluding(query, k, None)
    }

    /// Like [`search`](Self::search), skipping `exclude` (e.g. the query's own entry)
    pub fn search_excluding(
        &self,
        query: &[f32],
        k: usize,
        exclude: Option<&K>,
    ) -> Result<Vec<(K, f32)>> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.dimensions {
            if query.len() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: query.len(),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (key, _))| exclude != Some(key))
            .map(|(pos, (_, vector))| (pos, cosine_similarity(query, vector)))
            .collect();

        // Stable sort: equal scores stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(pos, score)| (self.entries[pos].0.clone(), score))
            .collect())
    }

    /// Embed `text` and search with the result
    pub async fn search_by_text<E>(
        &self,
        embedder: &E,
        text: &str,
        k: usize,
    ) -> Result<Vec<(K, f32)>>
    where
        E: EmbeddingProvider + ?Sized,
    {
        let query = embedder.embed(text).await?;
        self.search(&query, k)
    }

    /// Remove every entry whose key matches `predicate`, returning how many were removed
    pub fn delete_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&K) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|(key, _)| !predicate(key));
        let removed = before - self.entries.len();

        if removed > 0 {
            self.index = self
                .entries
                .iter()
                .enumerate()
                .map(|(pos, (key, _))| (key.clone(), pos))
                .collect();
        }
        removed
    }

    /// Remove everything; the dimension stays fixed
    pub fn delete_all(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
