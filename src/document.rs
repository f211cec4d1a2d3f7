//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document after text extraction.
///
/// One `Document` is produced per discovered file, or one per page for
/// paginated formats. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, derived from the source path (plus a page
    /// fragment for paginated formats).
    pub id: String,
    /// The extracted text content.
    pub text: String,
    /// Key-value metadata, e.g. source path, format, page number.
    pub metadata: HashMap<String, String>,
}

/// A bounded-length slice of a [`Document`]'s text.
///
/// Consecutive chunks from the same document overlap by a configured number
/// of characters so that context spanning a boundary is not severed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Metadata inherited from the parent document plus a `chunk_index` field.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}
