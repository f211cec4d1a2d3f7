//! Context-grounded answer synthesis.

use std::sync::Arc;

use tracing::debug;

use crate::document::ScoredChunk;
use crate::error::Result;
use crate::model::{LanguageModel, Message};
use crate::prompt;

/// Produces a grounded answer from retrieved chunks, history, and the
/// current question.
///
/// Uses the "stuff" strategy: every retrieved chunk is concatenated into a
/// single prompt and the model is called once. Prompt size is bounded by
/// `top_k * chunk_size`; overflowing the model's context window results in
/// model-dependent truncation. The answer is returned as the model produced
/// it, with no grounding or citation verification.
pub struct AnswerSynthesizer {
    model: Arc<dyn LanguageModel>,
}

impl AnswerSynthesizer {
    /// Create a synthesizer backed by the given model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Synthesize an answer to `question` from `context` and `history`.
    ///
    /// # Errors
    ///
    /// Propagates [`RagChatError::Generation`](crate::RagChatError::Generation)
    /// from the model call.
    pub async fn synthesize(
        &self,
        context: &[ScoredChunk],
        history: &[Message],
        question: &str,
    ) -> Result<String> {
        let messages = prompt::answer_messages(context, history, question);
        debug!(context_chunks = context.len(), history_len = history.len(), "synthesizing answer");

        self.model.generate(&messages).await
    }
}
