//! web-rag: Retrieval-augmented question answering over web pages
//!
//! Documents are split into fixed-size word chunks, embedded through a pluggable
//! [`providers::EmbeddingProvider`], and indexed in an in-memory exact k-NN index
//! (squared L2). Questions are embedded the same way, the closest chunks are
//! assembled into a bounded prompt, and a [`providers::LlmProvider`] writes the answer.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{ContextAssembler, Prompt};
pub use ingestion::{DocumentSource, StaticSource, WebPageSource, WordChunker};
pub use pipeline::{RagPipeline, NO_CONTEXT_ANSWER};
pub use providers::{BoundedEmbedder, EmbeddingProvider, LlmProvider};
pub use retrieval::{Retriever, VectorIndex};
pub use types::{
    chunk::{Chunk, ChunkMetadata, Document, IndexEntry},
    response::{RetrievalResult, SearchHit},
};
