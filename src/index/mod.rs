// Retrieval index
// Exact nearest-neighbor search over the aligned (chunk, vector) sequences.
// Built once from a full embedding set; read-only afterwards. Rebuilding
// means discarding the whole structure and constructing a new one.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::chunking::Chunk;
use crate::embeddings::EmbeddingProvider;
use crate::{RagError, Result};

/// In-memory similarity index over chunk embeddings.
///
/// Vector `i` embeds chunk `i`; that positional alignment is established
/// at build time and never mutated, so concurrent queries need no locking.
pub struct RetrievalIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
    embedder: Arc<dyn EmbeddingProvider>,
}

/// One retrieved chunk with its distance to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub distance: f32,
}

impl RetrievalIndex {
    /// Build an index from aligned chunk and vector sequences.
    ///
    /// Fails on an empty chunk set (a configuration error better raised
    /// at build time than discovered per query), on a count mismatch, or
    /// on ragged vector dimensions.
    #[inline]
    pub fn build(
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(RagError::Index(
                "Cannot build retrieval index from zero chunks".to_string(),
            ));
        }

        if chunks.len() != vectors.len() {
            return Err(RagError::Index(format!(
                "Chunk/vector count mismatch: {} chunks vs {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimension = vectors[0].len();
        if dimension == 0 {
            return Err(RagError::Index(
                "Embedding vectors have zero dimension".to_string(),
            ));
        }

        if let Some(bad) = vectors.iter().position(|v| v.len() != dimension) {
            return Err(RagError::Index(format!(
                "Inconsistent embedding dimensions: vector {bad} has {} dims, expected {dimension}",
                vectors[bad].len()
            )));
        }

        debug!(
            "Built retrieval index with {} chunks ({dimension} dims)",
            chunks.len()
        );

        Ok(Self {
            chunks,
            vectors,
            dimension,
            embedder,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Retrieve up to `top_k` chunks by ascending L2 distance to the
    /// query. `top_k` is clamped to the available chunk count; ties are
    /// broken by original sequence position.
    #[inline]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        Ok(self
            .search(query, top_k)?
            .into_iter()
            .map(|r| r.chunk)
            .collect())
    }

    /// Like `retrieve`, but keeps the distances for callers that report
    /// them.
    #[inline]
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed_query(query)?;

        if query_vector.len() != self.dimension {
            warn!(
                "Query embedding has {} dims, index expects {}; returning no results",
                query_vector.len(),
                self.dimension
            );
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (squared_l2_distance(&query_vector, v), i))
            .collect();

        // Ascending distance, ties broken by original position. Distances
        // are finite products of finite inputs, so total_cmp is exact here.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let top_k = top_k.min(self.chunks.len());
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, i)| SearchResult {
                chunk: self.chunks[i].clone(),
                distance,
            })
            .collect())
    }
}

fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
