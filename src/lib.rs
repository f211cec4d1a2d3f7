//! # ragchat
//!
//! Conversational retrieval-augmented generation over local document
//! corpora.
//!
//! ## Overview
//!
//! `ragchat` ingests a directory of documents (`.txt`, `.md`, `.pdf`),
//! splits them into overlapping chunks, embeds and indexes them for
//! similarity search, and answers questions grounded in the retrieved
//! passages while threading multi-turn conversation history.
//!
//! The two model capabilities are traits the caller supplies:
//!
//! - [`Embedder`] — maps text to a fixed-dimension vector
//! - [`LanguageModel`] — generates text from a role-tagged message sequence
//!
//! An OpenAI-compatible implementation of both ships behind the `openai`
//! feature.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragchat::{DocumentLoader, RagConfig, RagPipeline, VectorIndex};
//!
//! let config = RagConfig::default();
//!
//! // Ingest: files -> chunks -> embedded index (one-time).
//! let chunks = DocumentLoader::new(&config).load("./data").await?;
//! let index = VectorIndex::build(chunks, embedder.as_ref()).await?;
//!
//! let pipeline = RagPipeline::builder()
//!     .config(config)
//!     .embedder(embedder)
//!     .model(model)
//!     .index(Arc::new(index))
//!     .build()?;
//!
//! // Per turn: history is caller-owned and appended on success.
//! let mut history = Vec::new();
//! let answer = pipeline.answer(&mut history, "What is the capital of France?").await?;
//! let followup = pipeline.answer(&mut history, "And its population?").await?;
//! ```
//!
//! ## Design notes
//!
//! - Turns within a session are strictly sequential (the caller holds
//!   `&mut` history); the built [`VectorIndex`] is immutable and may be
//!   shared across sessions.
//! - Failures are typed: [`RagChatError::Ingestion`],
//!   [`RagChatError::Index`], [`RagChatError::Generation`]. A failed turn
//!   leaves history untouched.
//! - The crate emits `tracing` events but owns no subscriber.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
mod extract;
pub mod index;
pub mod loader;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod reformulate;
pub mod retriever;
pub mod synthesize;

pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, ScoredChunk};
pub use embedding::Embedder;
pub use error::{RagChatError, Result};
pub use index::VectorIndex;
pub use loader::DocumentLoader;
pub use model::{LanguageModel, Message, Role};
pub use pipeline::{RagPipeline, RagPipelineBuilder, SharedPipeline};
pub use reformulate::QueryReformulator;
pub use retriever::Retriever;
pub use synthesize::AnswerSynthesizer;
