//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for prompt-to-text generation
///
/// Implementations:
/// - `OllamaLlm`: Local Ollama server (llama3.2, phi3, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`, at most `max_output_length` words long
    async fn generate(&self, prompt: &str, max_output_length: usize) -> Result<String>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
