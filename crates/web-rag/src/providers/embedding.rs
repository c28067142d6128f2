//! Embedding provider trait and the input-bounding wrapper shared by build and query

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OllamaEmbedder`: Local Ollama server (nomic-embed-text)
///
/// Every call within one pipeline must return vectors of the same length.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Cut `text` to at most `max_chars` characters.
///
/// Leading whitespace is skipped before measuring. Prefers the last whitespace
/// boundary inside the limit so words stay whole; a single over-long word is
/// cut at the character limit.
pub fn bound_input(text: &str, max_chars: usize) -> &str {
    let text = text.trim_start();
    let end = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => byte_idx,
        None => return text,
    };

    let prefix = &text[..end];
    if text[end..].starts_with(char::is_whitespace) {
        return prefix.trim_end();
    }
    match prefix.rfind(char::is_whitespace) {
        Some(pos) if !prefix[..pos].trim().is_empty() => prefix[..pos].trim_end(),
        _ => prefix,
    }
}

/// Embedder handle used for both document chunks and queries.
///
/// Applies the same input bound and timeout to every call so chunk and
/// query vectors stay comparable.
#[derive(Clone)]
pub struct BoundedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    max_input_chars: usize,
    timeout: Option<Duration>,
}

impl BoundedEmbedder {
    /// Wrap a provider
    pub fn new(inner: Arc<dyn EmbeddingProvider>, max_input_chars: usize) -> Self {
        Self {
            inner,
            max_input_chars,
            timeout: None,
        }
    }

    /// Fail calls that take longer than `timeout` with [`Error::EmbedderTimeout`]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Longest input passed through, in characters
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }

    /// Underlying provider name
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Ask the underlying provider whether it is reachable
    pub async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }

    /// Embed `text` after bounding it
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let bounded = bound_input(text, self.max_input_chars);
        if bounded.len() < text.len() {
            tracing::debug!(
                "Embedding input cut from {} to {} bytes",
                text.len(),
                bounded.len()
            );
        }

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.embed(bounded))
                .await
                .map_err(|_| Error::EmbedderTimeout(limit))?,
            None => self.inner.embed(bounded).await,
        }
    }
}
