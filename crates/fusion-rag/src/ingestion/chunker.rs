//! Fixed-size character chunking with overlap

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};

/// Text chunker with configurable size and overlap.
///
/// Sizes are counted in `char`s, so a window never splits a UTF-8 sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    /// Window size in characters
    chunk_size: usize,
    /// Overlap between consecutive windows
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker, rejecting `chunk_size == 0` or `overlap >= chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        if overlap >= chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Create from config
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Window size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into overlapping windows.
    ///
    /// Windows start every `chunk_size - overlap` characters; splitting stops at
    /// the first window that reaches the end of the text.
    pub fn split(&self, text: &str) -> Vec<String> {
        // Byte offset of every char boundary, plus the end of the text
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0usize;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());

            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Undo the overlap: first chunk whole, then each later chunk minus its shared prefix
    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut text = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                text.push_str(chunk);
            } else {
                text.extend(chunk.chars().skip(overlap));
            }
        }
        text
    }

    #[test]
    fn test_sliding_window() {
        let chunker = TextChunker::new(4, 2).unwrap();
        assert_eq!(
            chunker.split("ABCDEFGHIJ"),
            vec!["ABCD", "CDEF", "EFGH", "GHIJ"]
        );
    }

    #[test]
    fn test_short_last_chunk() {
        let chunker = TextChunker::new(4, 1).unwrap();
        assert_eq!(chunker.split("ABCDEFGHIJ"), vec!["ABCD", "DEFG", "GHIJ"]);

        let chunker = TextChunker::new(4, 0).unwrap();
        assert_eq!(chunker.split("ABCDEFGHIJ"), vec!["ABCD", "EFGH", "IJ"]);
    }

    #[test]
    fn test_text_shorter_than_window() {
        let chunker = TextChunker::new(100, 20).unwrap();
        assert_eq!(chunker.split("short"), vec!["short"]);
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn test_multibyte_characters() {
        let chunker = TextChunker::new(2, 1).unwrap();
        assert_eq!(chunker.split("héé"), vec!["hé", "éé"]);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(TextChunker::new(0, 0), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(10, 10), Err(Error::Config(_))));
        assert!(matches!(TextChunker::new(10, 11), Err(Error::Config(_))));
    }

    proptest! {
        #[test]
        fn prop_chunks_reconstruct_text(
            text in "\\PC{1,300}",
            chunk_size in 1usize..40,
            overlap_seed in 0usize..40,
        ) {
            let overlap = overlap_seed % chunk_size;
            let chunker = TextChunker::new(chunk_size, overlap).unwrap();
            let chunks = chunker.split(&text);

            prop_assert!(!chunks.is_empty());
            prop_assert!(chunks.iter().all(|c| c.chars().count() <= chunk_size));
            prop_assert_eq!(reconstruct(&chunks, overlap), text);
        }
    }
}
