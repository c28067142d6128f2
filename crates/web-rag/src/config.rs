//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main RAG pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Prompt and answer bounds
    pub generation: GenerationConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Processing configuration
    pub processing: ProcessingConfig,
    /// Web page source configuration
    pub source: SourceConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: RagConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every size and bound is usable
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be positive"));
        }
        if self.embeddings.max_input_chars == 0 {
            return Err(Error::config("embeddings.max_input_chars must be positive"));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be positive"));
        }
        if self.generation.max_prompt_chars == 0 {
            return Err(Error::config("generation.max_prompt_chars must be positive"));
        }
        if self.generation.max_output_length == 0 {
            return Err(Error::config("generation.max_output_length must be positive"));
        }
        if self.processing.parallel_embeddings == Some(0) {
            return Err(Error::config("processing.parallel_embeddings must be positive"));
        }
        Ok(())
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Words per chunk
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 512 }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Longest input (in characters) passed to the embedder; applies to chunks and queries alike
    pub max_input_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 2048,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Prompt and answer bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Prompt budget in characters
    pub max_prompt_chars: usize,
    /// Answer budget in words
    pub max_output_length: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 4096,
            max_output_length: 150,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Concurrent embedding calls while building (default: CPU count, max 8)
    pub parallel_embeddings: Option<usize>,
    /// Per-call embedder timeout in seconds (none = wait indefinitely)
    pub embed_timeout_secs: Option<u64>,
    /// Per-call generator timeout in seconds (none = wait indefinitely)
    pub generate_timeout_secs: Option<u64>,
}

impl ProcessingConfig {
    /// Effective embedding parallelism
    pub fn embedding_parallelism(&self) -> usize {
        self.parallel_embeddings
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }

    /// Embedder timeout as a Duration
    pub fn embed_timeout(&self) -> Option<Duration> {
        self.embed_timeout_secs.map(Duration::from_secs)
    }

    /// Generator timeout as a Duration
    pub fn generate_timeout(&self) -> Option<Duration> {
        self.generate_timeout_secs.map(Duration::from_secs)
    }
}

/// Web page source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Pages to ingest
    pub urls: Vec<String>,
    /// Fetch timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with page requests
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            timeout_secs: 30,
            user_agent: concat!("web-rag/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
