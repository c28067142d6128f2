//! In-memory exact k-NN index over squared L2 distance

use rayon::prelude::*;
use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::types::{ChunkMetadata, IndexEntry, SearchHit};

/// Squared Euclidean distance between two equal-length vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Append-only vector index with brute-force search.
///
/// Built once from a batch of entries and never mutated afterwards, so a
/// shared reference can serve concurrent queries. Rebuilding means building
/// a new index.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    /// Dimensionality, fixed by the first entry
    dimensions: Option<usize>,
    /// Entries in insertion order
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from entries in insertion order.
    ///
    /// The first entry fixes the dimensionality; any later entry of a
    /// different length fails with [`Error::DimensionMismatch`].
    pub fn build<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = IndexEntry>,
    {
        let mut dimensions = None;
        let mut stored = Vec::new();

        for entry in entries {
            let actual = entry.vector.len();
            match dimensions {
                None => dimensions = Some(actual),
                Some(expected) if expected != actual => {
                    return Err(Error::DimensionMismatch { expected, actual });
                }
                Some(_) => {}
            }
            stored.push(entry);
        }

        tracing::debug!(
            "Built vector index with {} entries (dimensions: {:?})",
            stored.len(),
            dimensions
        );

        Ok(Self {
            dimensions,
            entries: stored,
        })
    }

    /// Build from `(vector, metadata)` pairs
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<f32>, ChunkMetadata)>,
    {
        Self::build(
            pairs
                .into_iter()
                .map(|(vector, metadata)| IndexEntry::new(vector, metadata)),
        )
    }

    /// Find the `k` entries closest to `query`, nearest first.
    ///
    /// Entries at equal distance keep their insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let expected = match self.dimensions {
            Some(d) if !self.entries.is_empty() => d,
            _ => return Err(Error::EmptyIndex),
        };
        if query.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .par_iter()
            .enumerate()
            .map(|(position, entry)| (position, squared_l2(query, &entry.vector)))
            .collect();

        scored.sort_by(|a, b| match a.1.total_cmp(&b.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(position, distance)| SearchHit {
                metadata: self.entries[position].metadata.clone(),
                distance,
            })
            .collect())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality, or `None` for an empty index
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}
