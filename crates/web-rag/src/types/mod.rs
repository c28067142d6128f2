//! Core types for the RAG pipeline

pub mod chunk;
pub mod response;

pub use chunk::{Chunk, ChunkMetadata, Document, IndexEntry};
pub use response::{RetrievalResult, SearchHit};
