//! In-memory vector index over cosine similarity.
//!
//! The index is built once from a chunked corpus and is immutable
//! afterwards, so it can be shared freely across concurrent retrieval
//! calls: [`VectorIndex::search`] takes `&self` and performs no mutation.

use tracing::info;

use crate::document::{Chunk, ScoredChunk};
use crate::embedding::Embedder;
use crate::error::{RagChatError, Result};

/// One indexed chunk with its embedding, kept in insertion order.
#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// An exact nearest-neighbor index over chunk embeddings.
///
/// Search is brute-force cosine similarity, which is exact and entirely
/// sufficient at the corpus sizes this crate targets. Results are ordered
/// nearest-first; ties keep insertion order (earliest-inserted wins), so
/// identical inputs always produce identical results.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Embed every chunk and build the index.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Index`] when `chunks` is empty (an index
    /// with nothing to retrieve is never useful), or when embedding the
    /// corpus fails, wrapping the underlying cause.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        if chunks.is_empty() {
            return Err(RagChatError::Index(
                "cannot build an index from an empty chunk set".to_string(),
            ));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RagChatError::Index(format!("corpus embedding failed: {e}")))?;

        if embeddings.len() != chunks.len() {
            return Err(RagChatError::Index(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        info!(entry_count = entries.len(), "built vector index");

        Ok(Self { entries, dimensions: embedder.dimensions() })
    }

    /// Return up to `k` chunks nearest to `query`, descending by cosine
    /// similarity. Ties are broken by insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries. Always `false` for an index
    /// produced by [`build`](VectorIndex::build).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the indexed vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
