//! Error types for the `ragchat` crate.

use thiserror::Error;

/// Errors that can occur across the RAG pipeline.
#[derive(Debug, Error)]
pub enum RagChatError {
    /// The ingestion root is missing or unreadable.
    ///
    /// Individual files that fail to extract are logged and skipped; this
    /// variant is reserved for failures on the root itself.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// The vector index could not be built — the chunk set was empty, or an
    /// internal build step (such as corpus embedding) failed.
    #[error("Index error: {0}")]
    Index(String),

    /// A language-model or embedding capability call failed.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The capability provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration or builder validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagChatError>;
