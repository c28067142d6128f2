//! Fixed-size word chunking

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Splits text into chunks of `chunk_size` whitespace-delimited words
#[derive(Debug, Clone, Copy)]
pub struct WordChunker {
    /// Words per chunk
    chunk_size: usize,
}

impl WordChunker {
    /// Create a new chunker; `chunk_size` must be positive
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::config("chunk_size must be positive"));
        }
        Ok(Self { chunk_size })
    }

    /// Words per chunk
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split text into chunks.
    ///
    /// Every chunk holds exactly `chunk_size` words except the last, which holds
    /// the remainder. Words are re-joined with single spaces and never split.
    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        words
            .chunks(self.chunk_size)
            .map(|window| window.join(" "))
            .collect()
    }

    /// Chunk a document, numbering chunks from 0 in reading order
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.split(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(sequence_index, text)| Chunk {
                source_id: doc.source_id.clone(),
                sequence_index,
                text,
            })
            .collect()
    }
}
