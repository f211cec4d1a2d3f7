//! Language-model capability trait and conversation message types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A system instruction to the model.
    System,
    /// A message from the end user.
    User,
    /// A message produced by the model.
    Assistant,
}

/// One role-tagged message.
///
/// Conversation history is an ordered, append-only sequence of `user` and
/// `assistant` messages, owned by the caller and threaded explicitly through
/// every pipeline call. `system` messages appear only in assembled prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A capability that generates text from an ordered message sequence.
///
/// Implementations wrap specific model backends behind a unified async
/// interface. The pipeline performs exactly one `generate` call per
/// reformulation and one per answer synthesis; it applies no timeout and no
/// retries of its own, so cancellation and provider errors surface to the
/// caller unchanged as [`RagChatError::Generation`](crate::RagChatError::Generation).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given message sequence.
    async fn generate(&self, messages: &[Message]) -> Result<String>;
}
