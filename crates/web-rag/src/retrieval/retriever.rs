//! Query-time retrieval: embed the question, search the index

use crate::error::Result;
use crate::providers::BoundedEmbedder;
use crate::types::RetrievalResult;

use super::index::VectorIndex;

/// Embeds questions and looks up their nearest chunks
#[derive(Clone)]
pub struct Retriever {
    embedder: BoundedEmbedder,
}

impl Retriever {
    /// Create a retriever over the same embedder used to build the index
    pub fn new(embedder: BoundedEmbedder) -> Self {
        Self { embedder }
    }

    /// Retrieve the `k` chunks closest to `query`, nearest first.
    ///
    /// Fails with `EmptyIndex` when the index has no entries and with
    /// `DimensionMismatch` when the query vector does not fit the index.
    pub async fn retrieve(
        &self,
        query: &str,
        index: &VectorIndex,
        k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let query_vector = self.embedder.embed(query).await?;
        let hits = index.search(&query_vector, k)?;

        tracing::debug!(
            "Retrieved {} chunks for query (closest distance: {:?})",
            hits.len(),
            hits.first().map(|h| h.distance)
        );

        Ok(hits.into_iter().map(RetrievalResult::from).collect())
    }
}
