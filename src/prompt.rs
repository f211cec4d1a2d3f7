//! Prompt assembly.
//!
//! Pure functions from (history, context, question) to ordered role-tagged
//! message sequences. No templating engine: prompts are built explicitly so
//! that what reaches the model is exactly what the code says.

use crate::document::ScoredChunk;
use crate::model::Message;

/// System instruction for rewriting a follow-up question so it stands alone.
const REFORMULATE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
     which might reference context in the chat history, \
     formulate a standalone question which can be understood \
     without the chat history. Do NOT answer the question, \
     just reformulate it if needed and otherwise return it as is.";

/// System instruction for answering strictly from retrieved context.
const ANSWER_SYSTEM_PROMPT: &str = "You are an assistant for question-answering tasks. \
     Use the following pieces of retrieved context to answer \
     the question. If you don't know the answer, just say \
     that you don't know. Use three sentences maximum \
     and keep the answer concise.";

/// Build the message sequence for query reformulation:
/// system instruction, then the prior history, then the new question.
pub fn reformulation_messages(history: &[Message], question: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(REFORMULATE_SYSTEM_PROMPT));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(question));
    messages
}

/// Build the message sequence for answer synthesis.
///
/// The retrieved chunks are concatenated directly into the system message
/// (the "stuff" strategy), followed by the prior history and the question.
/// Prompt size is therefore bounded by `top_k * chunk_size`; overflowing the
/// model's context window is left to the model to truncate.
pub fn answer_messages(context: &[ScoredChunk], history: &[Message], question: &str) -> Vec<Message> {
    let stuffed = context.iter().map(|c| c.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(format!("{ANSWER_SYSTEM_PROMPT}\n\n{stuffed}")));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::document::Chunk;
    use crate::model::Role;

    fn scored(text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: "d_0".to_string(),
                text: text.to_string(),
                metadata: HashMap::new(),
                document_id: "d".to_string(),
            },
            score: 0.9,
        }
    }

    #[test]
    fn reformulation_orders_system_history_question() {
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let messages = reformulation_messages(&history, "what about it?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1], history[0]);
        assert_eq!(messages[2], history[1]);
        assert_eq!(messages[3], Message::user("what about it?"));
        assert!(messages[0].content.contains("Do NOT answer the question"));
    }

    #[test]
    fn answer_prompt_stuffs_all_context_into_system_message() {
        let context = vec![scored("alpha facts"), scored("beta facts")];
        let messages = answer_messages(&context, &[], "question?");

        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("alpha facts"));
        assert!(messages[0].content.contains("beta facts"));
        assert!(messages[0].content.contains("don't know"));
        assert_eq!(messages[1], Message::user("question?"));
    }

    #[test]
    fn answer_prompt_with_empty_context_keeps_instruction() {
        let messages = answer_messages(&[], &[], "question?");
        assert!(messages[0].content.starts_with("You are an assistant"));
    }
}
