//! Retrieval: reformulate, embed, search.

use std::sync::Arc;

use tracing::info;

use crate::document::ScoredChunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::model::Message;
use crate::reformulate::QueryReformulator;

/// Composes the query reformulator, the embedder, and the vector index.
///
/// No retries happen at this layer; any failure propagates to the caller.
pub struct Retriever {
    reformulator: QueryReformulator,
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    top_k: usize,
    similarity_threshold: f32,
}

impl Retriever {
    /// Create a retriever over an already-built index.
    pub fn new(
        reformulator: QueryReformulator,
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        top_k: usize,
        similarity_threshold: f32,
    ) -> Self {
        Self { reformulator, embedder, index, top_k, similarity_threshold }
    }

    /// Retrieve the chunks most relevant to `question` given `history`.
    ///
    /// Reformulates the question against the history, embeds the standalone
    /// question, searches the index with the configured `top_k`, and drops
    /// results below the similarity threshold.
    pub async fn retrieve(&self, history: &[Message], question: &str) -> Result<Vec<ScoredChunk>> {
        let standalone = self.reformulator.reformulate(history, question).await?;
        let query = self.embedder.embed(&standalone).await?;

        let results = self.index.search(&query, self.top_k);
        let threshold = self.similarity_threshold;
        let retrieved: Vec<ScoredChunk> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(standalone = %standalone, result_count = retrieved.len(), "retrieval completed");
        Ok(retrieved)
    }
}
