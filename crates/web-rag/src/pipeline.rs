//! Pipeline driver: build an index from documents, answer questions against it

use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::ContextAssembler;
use crate::ingestion::{DocumentSource, WordChunker};
use crate::providers::{
    BoundedEmbedder, EmbeddingProvider, LlmProvider, OllamaClient, OllamaEmbedder, OllamaLlm,
};
use crate::retrieval::{Retriever, VectorIndex};
use crate::types::{Chunk, Document, IndexEntry, RetrievalResult};

/// Answer returned instead of calling the generator when nothing is indexed
pub const NO_CONTEXT_ANSWER: &str =
    "No context is available to answer this question: the index contains no documents.";

/// Composes chunking, embedding, search, prompt assembly and generation
pub struct RagPipeline {
    config: RagConfig,
    chunker: WordChunker,
    embedder: BoundedEmbedder,
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
}

impl RagPipeline {
    /// Create a pipeline from explicit providers
    pub fn new(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        config.validate()?;

        let chunker = WordChunker::new(config.chunking.chunk_size)?;
        let embedder = BoundedEmbedder::new(embedder, config.embeddings.max_input_chars)
            .with_timeout(config.processing.embed_timeout());
        let retriever = Retriever::new(embedder.clone());

        tracing::info!(
            "RAG pipeline ready (embedder: {}, generator: {} / {})",
            embedder.name(),
            llm.name(),
            llm.model()
        );

        Ok(Self {
            config,
            chunker,
            embedder,
            retriever,
            llm,
        })
    }

    /// Create a pipeline backed by a local Ollama server
    pub fn with_ollama(config: RagConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(&config.llm)?);
        let embedder = Arc::new(OllamaEmbedder::from_client(Arc::clone(&client)));
        let llm = Arc::new(OllamaLlm::from_client(client, config.llm.generate_model.clone()));
        Self::new(config, embedder, llm)
    }

    /// Pipeline configuration
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Chunker used while building
    pub fn chunker(&self) -> &WordChunker {
        &self.chunker
    }

    /// Retriever sharing the build-time embedder
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Fail unless both the embedder and the generator report themselves available
    pub async fn health_check(&self) -> Result<()> {
        if !self.embedder.health_check().await? {
            return Err(Error::embedding(format!(
                "embedding provider '{}' is not available",
                self.embedder.name()
            )));
        }
        if !self.llm.health_check().await? {
            return Err(Error::generation(format!(
                "generator '{}' ({}) is not available",
                self.llm.name(),
                self.llm.model()
            )));
        }
        Ok(())
    }

    /// Build a new index from documents.
    ///
    /// Chunks are embedded concurrently but entries are stored in document and
    /// chunk order. The first embedder failure aborts the whole build with
    /// [`Error::BuildFailure`]; no partial index is returned.
    pub async fn build_index<I, D>(&self, documents: I) -> Result<VectorIndex>
    where
        I: IntoIterator<Item = D>,
        D: Into<Document>,
    {
        let chunks: Vec<Chunk> = documents
            .into_iter()
            .flat_map(|doc| {
                let doc: Document = doc.into();
                self.chunker.chunk_document(&doc)
            })
            .collect();

        let parallelism = self.config.processing.embedding_parallelism();
        tracing::info!(
            "Embedding {} chunks ({} concurrent)",
            chunks.len(),
            parallelism
        );

        let embedder = &self.embedder;
        let entries: Vec<IndexEntry> = stream::iter(chunks)
            .map(move |chunk| async move {
                let vector = embedder.embed(&chunk.text).await.map_err(|e| {
                    tracing::warn!(
                        "Embedding failed for '{}' chunk {}: {}",
                        chunk.source_id,
                        chunk.sequence_index,
                        e
                    );
                    Error::build_failure(chunk.source_id.clone(), chunk.sequence_index, e)
                })?;
                Ok::<_, Error>(IndexEntry::new(vector, chunk.to_metadata()))
            })
            .buffered(parallelism)
            .try_collect()
            .await?;

        let index = VectorIndex::build(entries)?;
        tracing::info!(
            "Index built: {} entries, {:?} dimensions",
            index.len(),
            index.dimensions()
        );
        Ok(index)
    }

    /// Fetch every document from `source` and build an index from them
    pub async fn build_index_from_source(&self, source: &dyn DocumentSource) -> Result<VectorIndex> {
        let documents = source.fetch_documents().await?;
        tracing::info!(
            "Fetched {} documents from {} source",
            documents.len(),
            source.name()
        );
        self.build_index(documents).await
    }

    /// Answer `query` from the `k` closest chunks.
    ///
    /// An empty index, or `k == 0`, yields [`NO_CONTEXT_ANSWER`] without
    /// calling the generator. Every other failure is returned to the caller.
    pub async fn answer(&self, query: &str, index: &VectorIndex, k: usize) -> Result<String> {
        let results = match self.retriever.retrieve(query, index, k).await {
            Ok(results) => results,
            Err(Error::EmptyIndex) => {
                tracing::info!("Index is empty; returning the no-context answer");
                return Ok(NO_CONTEXT_ANSWER.to_string());
            }
            Err(e) => return Err(e),
        };

        self.answer_from_results(query, &results).await
    }

    /// Generate an answer from chunks already retrieved for `query`, nearest first.
    ///
    /// With no results the generator is not called and [`NO_CONTEXT_ANSWER`]
    /// is returned.
    pub async fn answer_from_results(
        &self,
        query: &str,
        results: &[RetrievalResult],
    ) -> Result<String> {
        if results.is_empty() {
            tracing::info!("No chunks retrieved; returning the no-context answer");
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let prompt =
            ContextAssembler::assemble(query, results, self.config.generation.max_prompt_chars);
        let max_output = self.config.generation.max_output_length;

        let generated = match self.config.processing.generate_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.llm.generate(prompt.as_str(), max_output))
                .await
                .map_err(|_| Error::GeneratorTimeout(limit))??,
            None => self.llm.generate(prompt.as_str(), max_output).await?,
        };

        Ok(clamp_words(generated, max_output))
    }

    /// Answer with the configured `retrieval.top_k`
    pub async fn answer_with_default_k(&self, query: &str, index: &VectorIndex) -> Result<String> {
        self.answer(query, index, self.config.retrieval.top_k).await
    }
}

/// Cut `text` to its first `max_words` words, logging when it had to
fn clamp_words(text: String, max_words: usize) -> String {
    let count = text.split_whitespace().count();
    if count <= max_words {
        return text;
    }

    tracing::warn!(
        "Generator returned {} words, over the {} word limit; truncating",
        count,
        max_words
    );
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
