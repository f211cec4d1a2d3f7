//! Embedding capability trait for mapping text to vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A capability that maps text to a fixed-dimension vector.
///
/// Implementations must be deterministic for identical input within a
/// session. The default [`embed_batch`](Embedder::embed_batch) calls
/// [`embed`](Embedder::embed) sequentially; backends with native batching
/// should override it.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text into a vector of [`dimensions`](Embedder::dimensions) floats.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts.
    ///
    /// The default implementation embeds each text sequentially. Override
    /// this method if the backend supports native batch embedding.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of vectors produced by this embedder.
    fn dimensions(&self) -> usize;
}
