//! Error types for the RAG pipeline

use std::time::Duration;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Vector length disagrees with the dimensionality of the index
    #[error("Embedding dimension mismatch: index has {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Search attempted against an index with zero entries
    #[error("Vector index is empty")]
    EmptyIndex,

    /// Embedding a chunk failed while building the index
    #[error("Index build failed at '{source_id}' chunk {sequence_index}: {source}")]
    BuildFailure {
        source_id: String,
        sequence_index: usize,
        #[source]
        source: Box<Error>,
    },

    /// Embedder failure
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Generator failure
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Embedder did not respond in time
    #[error("Embedding timed out after {0:?}")]
    EmbedderTimeout(Duration),

    /// Generator did not respond in time
    #[error("Generation timed out after {0:?}")]
    GeneratorTimeout(Duration),

    /// Document source failure
    #[error("Document source error: {0}")]
    Source(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML config parse error
    #[error("Failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a document source error
    pub fn source_failure(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wrap an embedder error raised while building the index
    pub fn build_failure(source_id: impl Into<String>, sequence_index: usize, cause: Error) -> Self {
        Self::BuildFailure {
            source_id: source_id.into(),
            sequence_index,
            source: Box::new(cause),
        }
    }

    /// True if this is [`Error::EmptyIndex`]
    pub fn is_empty_index(&self) -> bool {
        matches!(self, Self::EmptyIndex)
    }
}
