//! History-aware query reformulation.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::model::{LanguageModel, Message};
use crate::prompt;

/// Rewrites a follow-up question into a standalone question.
///
/// The rewrite is delegated entirely to the language model: one
/// [`LanguageModel::generate`] call, no local heuristics, and no fallback
/// to the raw question on failure. Callers that want a fallback can catch
/// the error themselves.
pub struct QueryReformulator {
    model: Arc<dyn LanguageModel>,
}

impl QueryReformulator {
    /// Create a reformulator backed by the given model.
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Produce a standalone question from `history` and `question`.
    ///
    /// # Errors
    ///
    /// Propagates [`RagChatError::Generation`](crate::RagChatError::Generation)
    /// from the model call.
    pub async fn reformulate(&self, history: &[Message], question: &str) -> Result<String> {
        let messages = prompt::reformulation_messages(history, question);
        let standalone = self.model.generate(&messages).await?.trim().to_string();

        debug!(question, standalone = %standalone, "reformulated question");
        Ok(standalone)
    }
}
