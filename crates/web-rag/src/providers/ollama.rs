//! Ollama-based providers for embeddings and generation
//!
//! One HTTP client with retry is shared by the embedder and the generator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Ollama API client with automatic retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < max_retries => {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}; retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding with retry
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let url = url.as_str();

        self.retry_request(|| async move {
            let request = EmbedRequest {
                model: self.config.embed_model.clone(),
                prompt: text.to_string(),
            };

            let response = self
                .client
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(Error::embedding(format!(
                    "Embedding failed: HTTP {}",
                    response.status()
                )));
            }

            let embed_response: EmbedResponse = response
                .json()
                .await
                .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

            Ok(embed_response.embedding)
        })
        .await
    }

    /// Generate a completion with retry, capped at `max_tokens` predicted tokens
    pub async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let url = url.as_str();

        tracing::info!("Generating answer with model: {}", self.config.generate_model);

        self.retry_request(|| async move {
            let request = GenerateRequest {
                model: self.config.generate_model.clone(),
                prompt: prompt.to_string(),
                stream: false,
                options: GenerateOptions {
                    temperature: self.config.temperature,
                    num_predict: max_tokens,
                },
            };

            let response = self
                .client
                .post(url)
                .json(&request)
                .send()
                .await
                .map_err(|e| Error::generation(format!("Generation request failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(Error::generation(format!(
                    "Generation failed: HTTP {} - {}",
                    status, body
                )));
            }

            let generate_response: GenerateResponse = response
                .json()
                .await
                .map_err(|e| Error::generation(format!("Failed to parse generation response: {}", e)))?;

            Ok(generate_response.response)
        })
        .await
    }
}

/// Ollama embedding provider using nomic-embed-text or similar models
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
}

impl OllamaEmbedder {
    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama LLM provider for answer generation
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    /// Create from existing OllamaClient
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str, max_output_length: usize) -> Result<String> {
        self.client.generate(prompt, max_output_length).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
