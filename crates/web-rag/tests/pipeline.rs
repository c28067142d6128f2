//! End-to-end pipeline behavior with stub embedder and generator

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use web_rag::config::RagConfig;
use web_rag::{
    Document, EmbeddingProvider, Error, LlmProvider, RagPipeline, Result, StaticSource,
    NO_CONTEXT_ANSWER,
};

/// Embeds text as its character count (1-D)
struct CharCountEmbedder;

#[async_trait]
impl EmbeddingProvider for CharCountEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.chars().count() as f32])
    }

    fn name(&self) -> &str {
        "char-count"
    }
}

/// Fails on any text containing a marker word
struct FailingEmbedder {
    marker: &'static str,
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(self.marker) {
            Err(Error::embedding("model crashed"))
        } else {
            Ok(vec![1.0])
        }
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Parses the text as a number and finishes later for smaller numbers
struct DelayedNumberEmbedder;

#[async_trait]
impl EmbeddingProvider for DelayedNumberEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let n: u64 = text
            .parse()
            .map_err(|_| Error::embedding(format!("not a number: {}", text)))?;
        tokio::time::sleep(Duration::from_millis(5 * (8 - n.min(8)))).await;
        Ok(vec![1.0])
    }

    fn name(&self) -> &str {
        "delayed"
    }
}

/// Embeds short texts with 1 dimension and long ones with 2
struct ShiftingEmbedder;

#[async_trait]
impl EmbeddingProvider for ShiftingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.len() > 6 {
            Ok(vec![0.0, 0.0])
        } else {
            Ok(vec![0.0])
        }
    }

    fn name(&self) -> &str {
        "shifting"
    }
}

/// Records prompts and returns a canned answer
struct RecordingLlm {
    answer: String,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl RecordingLlm {
    fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: "late".to_string(),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for RecordingLlm {
    async fn generate(&self, prompt: &str, _max_output_length: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn model(&self) -> &str {
        "stub"
    }
}

/// Reports itself unavailable
struct OfflineLlm;

#[async_trait]
impl LlmProvider for OfflineLlm {
    async fn generate(&self, _prompt: &str, _max_output_length: usize) -> Result<String> {
        Ok("unused".to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "offline"
    }

    fn model(&self) -> &str {
        "stub"
    }
}

/// Always fails
struct BrokenLlm;

#[async_trait]
impl LlmProvider for BrokenLlm {
    async fn generate(&self, _prompt: &str, _max_output_length: usize) -> Result<String> {
        Err(Error::generation("out of memory"))
    }

    fn name(&self) -> &str {
        "broken"
    }

    fn model(&self) -> &str {
        "stub"
    }
}

fn config(chunk_size: usize) -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size = chunk_size;
    config.processing.parallel_embeddings = Some(4);
    config
}

fn chicago() -> Vec<(&'static str, &'static str)> {
    vec![("docA", "Chicago is a city. It has a lake.")]
}

#[tokio::test]
async fn test_chicago_end_to_end() {
    let llm = RecordingLlm::new("It has a lake.");
    let pipeline = RagPipeline::new(config(3), Arc::new(CharCountEmbedder), llm.clone()).unwrap();

    let index = pipeline.build_index(chicago()).await.unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index.dimensions(), Some(1));
    let texts: Vec<&str> = index
        .entries()
        .iter()
        .map(|e| e.metadata.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Chicago is a", "city. It has", "a lake."]);

    let results = pipeline
        .retriever()
        .retrieve("lake", &index, 1)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source_id, "docA");
    assert_eq!(results[0].text, "a lake.");
    assert_eq!(results[0].distance, 9.0);

    let answer = pipeline.answer("lake", &index, 2).await.unwrap();
    assert_eq!(answer, "It has a lake.");
    assert_eq!(llm.calls(), 1);

    let prompts = llm.prompts.lock();
    assert!(prompts[0].starts_with("Question: lake\n\nContext:\na lake.\n"));
}

#[tokio::test]
async fn test_build_from_source() {
    let pipeline =
        RagPipeline::new(config(3), Arc::new(CharCountEmbedder), RecordingLlm::new("ok")).unwrap();
    let source = StaticSource::new(vec![
        Document::new("docA", "one two three four"),
        Document::new("docB", "five"),
    ]);

    let index = pipeline.build_index_from_source(&source).await.unwrap();

    let sources: Vec<&str> = index
        .entries()
        .iter()
        .map(|e| e.metadata.source_id.as_str())
        .collect();
    assert_eq!(sources, vec!["docA", "docA", "docB"]);
}

#[tokio::test]
async fn test_empty_index_returns_sentinel_without_generating() {
    let llm = RecordingLlm::new("should not be used");
    let pipeline = RagPipeline::new(config(3), Arc::new(CharCountEmbedder), llm.clone()).unwrap();

    let index = pipeline
        .build_index(vec![("empty", "   "), ("blank", "")])
        .await
        .unwrap();
    assert!(index.is_empty());

    let answer = pipeline.answer("anything?", &index, 5).await.unwrap();
    assert_eq!(answer, NO_CONTEXT_ANSWER);
    assert_eq!(llm.calls(), 0);

    let err = pipeline
        .retriever()
        .retrieve("anything?", &index, 5)
        .await
        .unwrap_err();
    assert!(err.is_empty_index());
}

#[tokio::test]
async fn test_zero_k_returns_sentinel_without_generating() {
    let llm = RecordingLlm::new("should not be used");
    let pipeline = RagPipeline::new(config(3), Arc::new(CharCountEmbedder), llm.clone()).unwrap();
    let index = pipeline.build_index(chicago()).await.unwrap();

    let answer = pipeline.answer("lake", &index, 0).await.unwrap();

    assert_eq!(answer, NO_CONTEXT_ANSWER);
    assert_eq!(llm.calls(), 0);
    assert!(llm.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_answer_from_retrieved_results() {
    let llm = RecordingLlm::new("It has a lake.");
    let pipeline = RagPipeline::new(config(3), Arc::new(CharCountEmbedder), llm.clone()).unwrap();
    let index = pipeline.build_index(chicago()).await.unwrap();

    let results = pipeline
        .retriever()
        .retrieve("lake", &index, 1)
        .await
        .unwrap();
    let answer = pipeline.answer_from_results("lake", &results).await.unwrap();
    assert_eq!(answer, "It has a lake.");
    assert_eq!(
        llm.prompts.lock()[0],
        "Question: lake\n\nContext:\na lake."
    );

    let empty = pipeline.answer_from_results("lake", &[]).await.unwrap();
    assert_eq!(empty, NO_CONTEXT_ANSWER);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_health_check() {
    let healthy =
        RagPipeline::new(config(3), Arc::new(CharCountEmbedder), RecordingLlm::new("ok")).unwrap();
    assert!(healthy.health_check().await.is_ok());

    let offline =
        RagPipeline::new(config(3), Arc::new(CharCountEmbedder), Arc::new(OfflineLlm)).unwrap();
    let err = offline.health_check().await.unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
    assert!(err.to_string().contains("offline"));
}

#[tokio::test]
async fn test_embedder_failure_aborts_build() {
    let pipeline = RagPipeline::new(
        config(2),
        Arc::new(FailingEmbedder { marker: "poison" }),
        RecordingLlm::new("ok"),
    )
    .unwrap();

    let err = pipeline
        .build_index(vec![
            ("docA", "fine words here"),
            ("docB", "more text with poison inside"),
        ])
        .await
        .unwrap_err();

    match err {
        Error::BuildFailure {
            source_id,
            sequence_index,
            source,
        } => {
            assert_eq!(source_id, "docB");
            assert_eq!(sequence_index, 1);
            assert!(matches!(*source, Error::Embedding(_)));
        }
        other => panic!("expected BuildFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_parallel_build_keeps_chunk_order() {
    let mut cfg = config(1);
    cfg.processing.parallel_embeddings = Some(8);
    let pipeline =
        RagPipeline::new(cfg, Arc::new(DelayedNumberEmbedder), RecordingLlm::new("ok")).unwrap();

    let index = pipeline
        .build_index(vec![("nums", "0 1 2 3 4 5 6 7")])
        .await
        .unwrap();

    let texts: Vec<&str> = index
        .entries()
        .iter()
        .map(|e| e.metadata.text.as_str())
        .collect();
    assert_eq!(texts, vec!["0", "1", "2", "3", "4", "5", "6", "7"]);

    // all vectors are equal, so ranking falls back to insertion order
    let hits = index.search(&[1.0], 3).unwrap();
    let ranked: Vec<&str> = hits.iter().map(|h| h.metadata.text.as_str()).collect();
    assert_eq!(ranked, vec!["0", "1", "2"]);
}

#[tokio::test]
async fn test_changing_dimensions_fail_build() {
    let pipeline =
        RagPipeline::new(config(1), Arc::new(ShiftingEmbedder), RecordingLlm::new("ok")).unwrap();

    let err = pipeline
        .build_index(vec![("doc", "short muchlonger")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: 1, actual: 2 }));
}

#[tokio::test]
async fn test_query_dimension_mismatch_propagates() {
    let llm = RecordingLlm::new("unused");
    let pipeline = RagPipeline::new(config(1), Arc::new(ShiftingEmbedder), llm.clone()).unwrap();

    let index = pipeline.build_index(vec![("doc", "tiny")]).await.unwrap();
    let err = pipeline
        .answer("a much longer question", &index, 1)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::DimensionMismatch { expected: 1, actual: 2 }));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_generator_failure_propagates() {
    let pipeline =
        RagPipeline::new(config(3), Arc::new(CharCountEmbedder), Arc::new(BrokenLlm)).unwrap();
    let index = pipeline.build_index(chicago()).await.unwrap();

    let err = pipeline.answer("lake", &index, 1).await.unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
}

#[tokio::test]
async fn test_generator_timeout() {
    let mut cfg = config(3);
    cfg.processing.generate_timeout_secs = Some(1);
    let pipeline = RagPipeline::new(
        cfg,
        Arc::new(CharCountEmbedder),
        RecordingLlm::slow(Duration::from_secs(3)),
    )
    .unwrap();
    let index = pipeline.build_index(chicago()).await.unwrap();

    let err = pipeline.answer("lake", &index, 1).await.unwrap_err();
    assert!(matches!(err, Error::GeneratorTimeout(d) if d == Duration::from_secs(1)));
}

#[tokio::test]
async fn test_answer_is_bounded() {
    let mut cfg = config(3);
    cfg.generation.max_output_length = 3;
    let pipeline = RagPipeline::new(
        cfg,
        Arc::new(CharCountEmbedder),
        RecordingLlm::new("Chicago has a big lake nearby"),
    )
    .unwrap();
    let index = pipeline.build_index(chicago()).await.unwrap();

    let answer = pipeline.answer_with_default_k("lake", &index).await.unwrap();
    assert_eq!(answer, "Chicago has a");
}

#[tokio::test]
async fn test_input_bound_applies_to_chunks_and_queries() {
    let mut cfg = config(100);
    cfg.embeddings.max_input_chars = 7;
    let pipeline =
        RagPipeline::new(cfg, Arc::new(CharCountEmbedder), RecordingLlm::new("ok")).unwrap();

    let index = pipeline
        .build_index(vec![("doc", "Chicago is a city")])
        .await
        .unwrap();
    // stored text is the full chunk, the vector comes from the bounded input
    assert_eq!(index.entries()[0].metadata.text, "Chicago is a city");
    assert_eq!(index.entries()[0].vector, vec![7.0]);

    let results = pipeline
        .retriever()
        .retrieve("Chicago lake question", &index, 1)
        .await
        .unwrap();
    assert_eq!(results[0].distance, 0.0);
}

#[tokio::test]
async fn test_prompt_respects_budget() {
    let mut cfg = config(1);
    cfg.generation.max_prompt_chars = "Question: q\n\nContext:\n".len() + 4;
    let llm = RecordingLlm::new("ok");
    let pipeline = RagPipeline::new(cfg, Arc::new(CharCountEmbedder), llm.clone()).unwrap();

    let index = pipeline
        .build_index(vec![("doc", "aaa bb c")])
        .await
        .unwrap();
    pipeline.answer("q", &index, 3).await.unwrap();

    // "c" (distance 0) and "bb" (distance 1) fit, "aaa" is dropped
    let prompts = llm.prompts.lock();
    assert_eq!(prompts[0], "Question: q\n\nContext:\nc\nbb");
}

#[test]
fn test_invalid_config_rejected() {
    let err = RagPipeline::new(config(0), Arc::new(CharCountEmbedder), RecordingLlm::new("ok"))
        .err()
        .unwrap();
    assert!(matches!(err, Error::Config(_)));
}
