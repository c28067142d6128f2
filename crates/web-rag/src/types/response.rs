//! Search and retrieval result types

use serde::{Deserialize, Serialize};

use super::chunk::ChunkMetadata;

/// Raw k-NN match returned by the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Metadata of the matched entry
    pub metadata: ChunkMetadata,
    /// Squared L2 distance to the query (lower is closer)
    pub distance: f32,
}

/// A retrieved chunk, ranked by ascending distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Source document identity
    pub source_id: String,
    /// Chunk text
    pub text: String,
    /// Squared L2 distance to the query
    pub distance: f32,
}

impl From<SearchHit> for RetrievalResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            source_id: hit.metadata.source_id,
            text: hit.metadata.text,
            distance: hit.distance,
        }
    }
}
