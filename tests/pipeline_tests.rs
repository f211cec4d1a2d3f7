//! End-to-end pipeline tests with stubbed model capabilities.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ragchat::{
    Chunk, DocumentLoader, Embedder, LanguageModel, Message, QueryReformulator, RagChatError,
    RagConfig, RagPipeline, SharedPipeline, VectorIndex,
};

/// Deterministic embedder: one dimension per keyword, counting occurrences.
const KEYWORDS: [&str; 6] = ["france", "paris", "japan", "tokyo", "capital", "city"];

struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> ragchat::Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(KEYWORDS.iter().map(|k| lower.matches(k).count() as f32).collect())
    }

    fn dimensions(&self) -> usize {
        KEYWORDS.len()
    }
}

/// Scripted model: echoes reformulation questions (resolving the one
/// follow-up the tests use) and parrots the stuffed context back as the
/// answer, so assertions can check grounding.
struct ScriptedModel;

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, messages: &[Message]) -> ragchat::Result<String> {
        let system = &messages[0].content;
        let question = messages.last().expect("prompt always ends with the question").content.clone();

        if system.starts_with("Given a chat history") {
            if question.to_lowercase().contains("what about japan") {
                Ok("What is the capital of Japan?".to_string())
            } else {
                Ok(question)
            }
        } else {
            Ok(system.clone())
        }
    }
}

/// Reformulates fine, fails every synthesis call.
struct FailingSynthesisModel;

#[async_trait]
impl LanguageModel for FailingSynthesisModel {
    async fn generate(&self, messages: &[Message]) -> ragchat::Result<String> {
        let system = &messages[0].content;
        if system.starts_with("Given a chat history") {
            Ok(messages.last().unwrap().content.clone())
        } else {
            Err(RagChatError::Generation {
                provider: "stub".to_string(),
                message: "synthesis unavailable".to_string(),
            })
        }
    }
}

/// Returns the latest user message unchanged.
struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn generate(&self, messages: &[Message]) -> ragchat::Result<String> {
        Ok(messages.last().unwrap().content.clone())
    }
}

fn chunk(id: &str, text: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        metadata: HashMap::new(),
        document_id: id.to_string(),
    }
}

async fn capitals_pipeline(model: Arc<dyn LanguageModel>) -> RagPipeline {
    let chunks = vec![
        chunk("france", "Paris is the capital of France."),
        chunk("japan", "Tokyo is the capital of Japan."),
    ];
    let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder);
    let index = VectorIndex::build(chunks, embedder.as_ref()).await.unwrap();

    RagPipeline::builder()
        .config(RagConfig::default())
        .embedder(embedder)
        .model(model)
        .index(Arc::new(index))
        .build()
        .unwrap()
}

#[tokio::test]
async fn build_rejects_empty_chunk_set() {
    let err = VectorIndex::build(Vec::new(), &KeywordEmbedder).await.unwrap_err();
    assert!(matches!(err, RagChatError::Index(_)));
}

#[tokio::test]
async fn single_chunk_round_trip() {
    let c = chunk("solo", "Paris is the capital of France.");
    let embedder = KeywordEmbedder;
    let index = VectorIndex::build(vec![c.clone()], &embedder).await.unwrap();

    let query = embedder.embed(&c.text).await.unwrap();
    let results = index.search(&query, 1);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk, c);
}

#[tokio::test]
async fn france_question_ranks_france_chunk_first() {
    let chunks = vec![
        chunk("france", "Paris is the capital of France."),
        chunk("japan", "Tokyo is the capital of Japan."),
    ];
    let embedder = KeywordEmbedder;
    let index = VectorIndex::build(chunks, &embedder).await.unwrap();

    let query = embedder.embed("What is the capital of France?").await.unwrap();
    let results = index.search(&query, 3);

    assert_eq!(results[0].chunk.id, "france");
    assert!(results[0].score > results[1].score);
}

#[tokio::test]
async fn reformulation_returns_self_contained_question_unchanged() {
    let reformulator = QueryReformulator::new(Arc::new(EchoModel));
    let standalone =
        reformulator.reformulate(&[], "What is the capital of France?").await.unwrap();
    assert_eq!(standalone, "What is the capital of France?");
}

#[tokio::test]
async fn answer_grounds_in_the_best_matching_chunk() {
    let pipeline = capitals_pipeline(Arc::new(ScriptedModel)).await;

    let mut history = Vec::new();
    let answer =
        pipeline.answer(&mut history, "What is the capital of France?").await.unwrap();

    assert!(answer.contains("Paris"));
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], Message::user("What is the capital of France?"));
    assert_eq!(history[1], Message::assistant(answer));
}

#[tokio::test]
async fn follow_up_turn_retrieves_via_reformulated_question() {
    let pipeline = capitals_pipeline(Arc::new(ScriptedModel)).await;

    let mut history = Vec::new();
    pipeline.answer(&mut history, "What is the capital of France?").await.unwrap();
    let answer = pipeline.answer(&mut history, "What about Japan?").await.unwrap();

    assert!(answer.contains("Tokyo"));
    assert_eq!(history.len(), 4);
    assert_eq!(history[2], Message::user("What about Japan?"));
}

#[tokio::test]
async fn failed_turn_leaves_history_untouched() {
    let pipeline = capitals_pipeline(Arc::new(FailingSynthesisModel)).await;

    let mut history = vec![
        Message::user("What is the capital of France?"),
        Message::assistant("Paris."),
    ];
    let err = pipeline.answer(&mut history, "What about Japan?").await.unwrap_err();

    assert!(matches!(err, RagChatError::Generation { .. }));
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn ingests_directory_and_answers_end_to_end() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("france.txt"), "Paris is the capital of France.").unwrap();
    fs::write(temp.path().join("japan.txt"), "Tokyo is the capital of Japan.").unwrap();
    fs::write(temp.path().join("ignored.csv"), "city,country").unwrap();

    let config = RagConfig::default();
    let chunks = DocumentLoader::new(&config).load(temp.path()).await.unwrap();
    assert_eq!(chunks.len(), 2);

    let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder);
    let index = VectorIndex::build(chunks, embedder.as_ref()).await.unwrap();
    let pipeline = RagPipeline::builder()
        .config(config)
        .embedder(embedder)
        .model(Arc::new(ScriptedModel))
        .index(Arc::new(index))
        .build()
        .unwrap();

    let mut history = Vec::new();
    let answer =
        pipeline.answer(&mut history, "What is the capital of France?").await.unwrap();
    assert!(answer.contains("Paris"));
}

#[tokio::test]
async fn shared_pipeline_initializes_exactly_once() {
    let shared = SharedPipeline::new();
    let init_count = AtomicUsize::new(0);

    let first = shared
        .get_or_init(|| async {
            init_count.fetch_add(1, Ordering::SeqCst);
            Ok(capitals_pipeline(Arc::new(ScriptedModel)).await)
        })
        .await
        .unwrap();
    let second = shared
        .get_or_init(|| async {
            init_count.fetch_add(1, Ordering::SeqCst);
            Ok(capitals_pipeline(Arc::new(ScriptedModel)).await)
        })
        .await
        .unwrap();

    assert_eq!(init_count.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn shared_pipeline_retries_after_failed_initialization() {
    let shared = SharedPipeline::new();

    let err = shared
        .get_or_init(|| async { Err(RagChatError::Config("boom".to_string())) })
        .await
        .unwrap_err();
    assert!(matches!(err, RagChatError::Config(_)));

    let pipeline = shared
        .get_or_init(|| async { Ok(capitals_pipeline(Arc::new(ScriptedModel)).await) })
        .await;
    assert!(pipeline.is_ok());
}
