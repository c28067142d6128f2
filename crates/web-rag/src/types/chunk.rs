//! Document, chunk and index entry types

use serde::{Deserialize, Serialize};

/// A fetched document ready for chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Where the text came from (a page URL for web sources)
    pub source_id: String,
    /// Extracted plain text
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

impl<S: Into<String>, T: Into<String>> From<(S, T)> for Document {
    fn from((source_id, text): (S, T)) -> Self {
        Self::new(source_id, text)
    }
}

/// A bounded slice of a document's words
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identity
    pub source_id: String,
    /// Position of this chunk within its source, starting at 0
    pub sequence_index: usize,
    /// Chunk text (words joined by single spaces)
    pub text: String,
}

impl Chunk {
    /// Metadata copied into the index for this chunk
    pub fn to_metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            source_id: self.source_id.clone(),
            text: self.text.clone(),
        }
    }
}

/// Addressable fields of a chunk, owned by the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_id: String,
    pub text: String,
}

/// A vector plus the metadata it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

impl IndexEntry {
    /// Create a new entry
    pub fn new(vector: Vec<f32>, metadata: ChunkMetadata) -> Self {
        Self { vector, metadata }
    }
}
