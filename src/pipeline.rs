//! Conversational pipeline orchestration.
//!
//! [`RagPipeline`] runs one question-answering turn as two named phases:
//! RETRIEVE (history-aware retrieval) then SYNTHESIZE (grounded answer
//! generation). Conversation history is caller-owned and passed explicitly
//! into every call; there is no process-wide session state.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragchat::{DocumentLoader, RagConfig, RagPipeline, VectorIndex};
//!
//! let config = RagConfig::default();
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
//! let mut history = Vec::new();
//! let answer = pipeline.answer(&mut history, "What is the capital of France?").await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::RagConfig;
use crate::embedding::Embedder;
use crate::error::{RagChatError, Result};
use crate::index::VectorIndex;
use crate::model::{LanguageModel, Message};
use crate::reformulate::QueryReformulator;
use crate::retriever::Retriever;
use crate::synthesize::AnswerSynthesizer;

/// The per-turn orchestrator. Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline").finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Answer one question, threading the conversation history.
    ///
    /// The history passed to both phases is the history *prior to* this
    /// turn. On success, the user question and the assistant answer are
    /// appended to `history`; on any failure nothing is appended, so a
    /// failed turn leaves the session exactly as it was.
    ///
    /// # Errors
    ///
    /// Propagates [`RagChatError::Generation`](crate::RagChatError::Generation)
    /// from reformulation, query embedding, or synthesis.
    pub async fn answer(&self, history: &mut Vec<Message>, question: &str) -> Result<String> {
        let retrieved = self.retriever.retrieve(history, question).await.map_err(|e| {
            error!(error = %e, "retrieval phase failed");
            e
        })?;

        // SYNTHESIZE always runs, even on an empty retrieval result.
        let answer =
            self.synthesizer.synthesize(&retrieved, history, question).await.map_err(|e| {
                error!(error = %e, "synthesis phase failed");
                e
            })?;

        history.push(Message::user(question));
        history.push(Message::assistant(answer.clone()));

        info!(retrieved_count = retrieved.len(), history_len = history.len(), "turn completed");
        Ok(answer)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All fields are required. Call [`build()`](RagPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    model: Option<Arc<dyn LanguageModel>>,
    index: Option<Arc<VectorIndex>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding capability.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the language-model capability.
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the built vector index to retrieve from.
    pub fn index(mut self, index: Arc<VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`RagPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagChatError::Config`] if any required field is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagChatError::Config("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagChatError::Config("embedder is required".to_string()))?;
        let model =
            self.model.ok_or_else(|| RagChatError::Config("model is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| RagChatError::Config("index is required".to_string()))?;

        let retriever = Retriever::new(
            QueryReformulator::new(model.clone()),
            embedder,
            index,
            config.top_k,
            config.similarity_threshold,
        );
        let synthesizer = AnswerSynthesizer::new(model);

        Ok(RagPipeline { retriever, synthesizer })
    }
}

/// Lazily initialized, shareable pipeline state.
///
/// Pipeline construction is expensive (it ingests and embeds a whole
/// corpus), so long-lived processes build it once and share it. First-call
/// semantics are thread-safe and idempotent: concurrent first callers race
/// on a single initialization, an initialization error is returned to the
/// caller and retried on the next call, and every later call returns the
/// same shared pipeline.
///
/// # Example
///
/// ```rust,ignore
/// static PIPELINE: SharedPipeline = SharedPipeline::new();
///
/// let pipeline = PIPELINE.get_or_init(|| async { build_pipeline().await }).await?;
/// ```
pub struct SharedPipeline {
    cell: OnceCell<Arc<RagPipeline>>,
}

impl SharedPipeline {
    /// Create an empty, uninitialized cell.
    pub const fn new() -> Self {
        Self { cell: OnceCell::const_new() }
    }

    /// Return the shared pipeline, initializing it on first call.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<Arc<RagPipeline>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RagPipeline>>,
    {
        self.cell.get_or_try_init(|| async { init().await.map(Arc::new) }).await.cloned()
    }

    /// The already-initialized pipeline, if any.
    pub fn get(&self) -> Option<Arc<RagPipeline>> {
        self.cell.get().cloned()
    }
}

impl Default for SharedPipeline {
    fn default() -> Self {
        Self::new()
    }
}
