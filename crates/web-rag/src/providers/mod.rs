//! Provider abstractions for embeddings and answer generation
//!
//! The pipeline only sees the traits; the Ollama adapters are one backend.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::{bound_input, BoundedEmbedder, EmbeddingProvider};
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
