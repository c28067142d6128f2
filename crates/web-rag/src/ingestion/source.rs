//! Document sources: where the text to index comes from

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::Document;

/// Trait for anything that can produce `(source_id, text)` documents
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch every document, in a stable order
    async fn fetch_documents(&self) -> Result<Vec<Document>>;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// In-memory documents, returned as given
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Vec<Document>,
}

impl StaticSource {
    /// Create from a list of documents
    pub fn new<I, D>(documents: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Document>,
    {
        Self {
            documents: documents.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Fetches web pages and keeps the text of their `<p>` elements
pub struct WebPageSource {
    client: Client,
    urls: Vec<String>,
}

impl WebPageSource {
    /// Create a source for the given URLs
    pub fn new(urls: Vec<String>, config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, urls })
    }

    /// Create a source for the URLs listed in the config
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(config.urls.clone(), config)
    }

    async fn fetch_page(&self, url: &str) -> Result<Document> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::source_failure(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::source_failure(format!(
                "Fetching {} failed: HTTP {}",
                url,
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| Error::source_failure(format!("Failed to read body of {}: {}", url, e)))?;

        let text = extract_paragraph_text(&html)?;
        tracing::debug!("Fetched {} ({} chars of paragraph text)", url, text.len());

        Ok(Document::new(url, text))
    }
}

#[async_trait]
impl DocumentSource for WebPageSource {
    async fn fetch_documents(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            documents.push(self.fetch_page(url).await?);
        }
        tracing::info!("Fetched {} web pages", documents.len());
        Ok(documents)
    }

    fn name(&self) -> &str {
        "web"
    }
}

/// Join the text of every `<p>` element with single spaces
pub fn extract_paragraph_text(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let paragraph = Selector::parse("p")
        .map_err(|e| Error::source_failure(format!("Invalid paragraph selector: {}", e)))?;

    let paragraphs: Vec<String> = document
        .select(&paragraph)
        .map(|p| p.text().collect::<String>())
        .collect();

    Ok(paragraphs.join(" "))
}
