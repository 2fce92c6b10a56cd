//! Ingestion, search and answering through the pipeline handle

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use fusion_rag::ingestion::TextChunker;
use fusion_rag::{
    AnswerOptions, AnswerOutcome, DocumentContent, Error, FuseOptions, IngestError,
    PipelineStats, RagPipeline,
};

fn chunks_of(text: &str) -> Vec<String> {
    let config = test_config();
    TextChunker::from_config(&config.chunking)
        .unwrap()
        .split(text)
}

async fn loaded_pipeline() -> (RagPipeline, Arc<HashEmbedder>, Arc<ScriptedChat>) {
    let embedder = Arc::new(HashEmbedder::new());
    let chat = Arc::new(ScriptedChat::new("", "scripted answer"));
    let pipeline = pipeline_with(embedder.clone(), chat.clone());

    pipeline.ingest("rust", RUST_DOC).await.unwrap();
    pipeline.ingest("pasta", PASTA_DOC).await.unwrap();
    pipeline.ingest("fusion", FUSION_DOC).await.unwrap();
    (pipeline, embedder, chat)
}

#[tokio::test]
async fn test_ingest_reports_chunks_and_characters() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedChat::new("", "")),
    );

    let report = pipeline.ingest("rust", RUST_DOC).await.unwrap();
    assert_eq!(report.document_id, "rust");
    assert_eq!(report.chunks_created, chunks_of(RUST_DOC).len());
    assert_eq!(report.total_characters, RUST_DOC.chars().count());

    let stats = pipeline.stats();
    assert_eq!(stats.document_count, 1);
    assert_eq!(stats.total_chunks, report.chunks_created);
    assert_eq!(stats.vector_count, report.chunks_created);
    assert_eq!(stats.documents, vec!["rust".to_string()]);
}

#[tokio::test]
async fn test_ingest_plain_text_bytes() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedChat::new("", "")),
    );

    let report = pipeline
        .ingest("notes.txt", RUST_DOC.as_bytes().to_vec())
        .await
        .unwrap();
    assert_eq!(report.total_characters, RUST_DOC.chars().count());
}

#[tokio::test]
async fn test_search_ranks_matching_document_first() {
    let (pipeline, _, _) = loaded_pipeline().await;

    let results = pipeline
        .search("borrow checker owner references", 1)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(chunks_of(RUST_DOC).contains(&results[0]));
}

#[tokio::test]
async fn test_search_is_deterministic() {
    let (pipeline, _, _) = loaded_pipeline().await;

    let first = pipeline.search("tomato sauce for pasta", 3).await.unwrap();
    let second = pipeline.search("tomato sauce for pasta", 3).await.unwrap();
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_search_empty_store_skips_embedder() {
    let embedder = Arc::new(HashEmbedder::new());
    let pipeline = pipeline_with(embedder.clone(), Arc::new(ScriptedChat::new("", "")));

    assert!(pipeline.search("anything", 3).await.unwrap().is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn test_search_with_zero_k() {
    let (pipeline, _, _) = loaded_pipeline().await;
    assert!(pipeline.search("pasta", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_with_huge_k_returns_every_chunk() {
    let (pipeline, _, _) = loaded_pipeline().await;

    let results = pipeline.search("owner", usize::MAX).await.unwrap();
    assert_eq!(results.len(), pipeline.stats().vector_count);
}

#[tokio::test]
async fn test_failed_embedding_commits_nothing() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::failing_on("POISON")),
        Arc::new(ScriptedChat::new("", "")),
    );
    pipeline.ingest("doc", RUST_DOC).await.unwrap();
    let before = pipeline.stats();

    // Replacement of an existing document
    let result = pipeline
        .ingest("doc", format!("{} POISON {}", PASTA_DOC, PASTA_DOC))
        .await;
    assert!(matches!(result, Err(IngestError::Embedding(_))));

    // Brand new document
    let result = pipeline.ingest("other", "short POISON text").await;
    assert!(matches!(result, Err(IngestError::Embedding(_))));

    assert_eq!(pipeline.stats(), before);
    let results = pipeline.search("borrow checker", 1).await.unwrap();
    assert!(chunks_of(RUST_DOC).contains(&results[0]));
}

#[tokio::test]
async fn test_short_embedding_batch_is_rejected() {
    let pipeline = pipeline_with(
        Arc::new(ShortBatchEmbedder),
        Arc::new(ScriptedChat::new("", "")),
    );

    match pipeline.ingest("rust", RUST_DOC).await {
        Err(IngestError::EmbeddingCount { expected, actual }) => {
            assert_eq!(expected, chunks_of(RUST_DOC).len());
            assert_eq!(actual, expected - 1);
        }
        other => panic!("expected EmbeddingCount, got {:?}", other),
    }
    assert_eq!(pipeline.stats(), PipelineStats::default());
}

#[tokio::test]
async fn test_blank_documents_have_no_extractable_text() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedChat::new("", "")),
    );

    let blank = pipeline.ingest("blank", "  \n\t ").await;
    assert!(matches!(blank, Err(IngestError::NoExtractableText)));

    let empty = pipeline.ingest("empty", Vec::<u8>::new()).await;
    assert!(matches!(empty, Err(IngestError::NoExtractableText)));

    assert_eq!(pipeline.stats().document_count, 0);
}

#[tokio::test]
async fn test_reingest_replaces_document() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedChat::new("", "")),
    );

    pipeline.ingest("doc", RUST_DOC).await.unwrap();
    let report = pipeline.ingest("doc", "tiny").await.unwrap();
    assert_eq!(report.chunks_created, 1);

    let stats = pipeline.stats();
    assert_eq!(stats.document_count, 1);
    assert_eq!(stats.vector_count, 1);
    assert_eq!(pipeline.search("tiny", 5).await.unwrap(), vec!["tiny".to_string()]);
}

#[tokio::test]
async fn test_ingest_many_isolates_failures_and_keeps_order() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::failing_on("POISON")),
        Arc::new(ScriptedChat::new("", "")),
    );

    let documents = vec![
        ("rust".to_string(), DocumentContent::from(RUST_DOC)),
        ("bad".to_string(), DocumentContent::from("POISON")),
        ("blank".to_string(), DocumentContent::from("   ")),
        ("pasta".to_string(), DocumentContent::from(PASTA_DOC)),
    ];
    let results = pipeline.ingest_many(documents).await;

    let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["rust", "bad", "blank", "pasta"]);
    assert!(results[0].1.is_ok());
    assert!(matches!(results[1].1, Err(IngestError::Embedding(_))));
    assert!(matches!(results[2].1, Err(IngestError::NoExtractableText)));
    assert!(results[3].1.is_ok());

    assert_eq!(
        pipeline.stats().documents,
        vec!["pasta".to_string(), "rust".to_string()]
    );
}

#[tokio::test]
async fn test_clear_then_query_is_empty() {
    let (pipeline, _, _) = loaded_pipeline().await;

    pipeline.clear();
    assert_eq!(pipeline.stats(), PipelineStats::default());
    assert!(pipeline.search("pasta", 3).await.unwrap().is_empty());
    assert!(pipeline
        .fuse("pasta", &FuseOptions::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_remove_single_document() {
    let (pipeline, _, _) = loaded_pipeline().await;

    assert!(pipeline.remove("pasta"));
    assert!(!pipeline.remove("pasta"));
    assert_eq!(
        pipeline.stats().documents,
        vec!["fusion".to_string(), "rust".to_string()]
    );
}

#[tokio::test]
async fn test_clones_share_the_corpus() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::new()),
        Arc::new(ScriptedChat::new("", "")),
    );

    let mut handles = Vec::new();
    for i in 0..8 {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            pipeline
                .ingest(&format!("doc-{}", i), format!("document number {}", i))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(pipeline.stats().document_count, 8);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_ingest_commits_nothing() {
    let pipeline = pipeline_with(
        Arc::new(HashEmbedder::slow(Duration::from_secs(10))),
        Arc::new(ScriptedChat::new("", "")),
    );

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        pipeline.ingest("doc", RUST_DOC),
    )
    .await;
    assert!(outcome.is_err());
    assert_eq!(pipeline.stats(), PipelineStats::default());
}

#[tokio::test(start_paused = true)]
async fn test_embedding_timeout_is_reported() {
    let mut config = test_config();
    config.retrieval.embedding_timeout_secs = 1;
    let pipeline = RagPipeline::builder(config)
        .embedder(Arc::new(HashEmbedder::slow(Duration::from_secs(5))))
        .chat(Arc::new(ScriptedChat::new("", "")))
        .build()
        .unwrap();

    let result = pipeline.ingest("doc", RUST_DOC).await;
    assert!(matches!(result, Err(IngestError::Timeout { .. })));
    assert_eq!(pipeline.stats().document_count, 0);
}

#[tokio::test]
async fn test_answer_without_content_skips_model() {
    let chat = Arc::new(ScriptedChat::new("", "should not be used"));
    let pipeline = pipeline_with(Arc::new(HashEmbedder::new()), chat.clone());

    let outcome = pipeline
        .answer("what is ownership?", &AnswerOptions::search(3))
        .await
        .unwrap();
    assert_eq!(outcome, AnswerOutcome::NoRelevantContent);
    assert!(outcome.answer().is_none());
    assert!(chat.answer_requests().is_empty());
}

#[tokio::test]
async fn test_answer_uses_retrieved_context() {
    let (pipeline, _, chat) = loaded_pipeline().await;

    let outcome = pipeline
        .answer("borrow checker owner", &AnswerOptions::search(2))
        .await
        .unwrap();

    match &outcome {
        AnswerOutcome::Answered { answer, context } => {
            assert_eq!(answer, "scripted answer");
            assert_eq!(context.len(), 2);
        }
        other => panic!("expected an answer, got {:?}", other),
    }

    let requests = chat.answer_requests();
    assert_eq!(requests.len(), 1);
    let (messages, options) = &requests[0];
    assert!(messages[1].content.contains("Question: borrow checker owner"));
    assert_eq!(options.model.as_deref(), Some("gpt-4.1-mini"));
    assert_eq!(options.temperature, Some(0.7));
}

#[tokio::test]
async fn test_answer_model_override() {
    let (pipeline, _, chat) = loaded_pipeline().await;

    let mut options = AnswerOptions::search(1);
    options.model = Some("custom-model".to_string());
    pipeline.answer("pasta", &options).await.unwrap();

    let requests = chat.answer_requests();
    assert_eq!(requests[0].1.model.as_deref(), Some("custom-model"));
}

async fn slow_answer_pipeline(delay: Duration) -> RagPipeline {
    let mut config = test_config();
    config.openai.timeout_secs = 1;
    config.openai.max_retries = 2;
    let mut chat = ScriptedChat::new("", "late answer");
    chat.answer_delay = Some(delay);
    let pipeline = RagPipeline::builder(config)
        .embedder(Arc::new(HashEmbedder::new()))
        .chat(Arc::new(chat))
        .build()
        .unwrap();
    pipeline.ingest("rust", RUST_DOC).await.unwrap();
    pipeline
}

#[tokio::test(start_paused = true)]
async fn test_answer_waits_through_retry_backoff() {
    // Three 1s attempts plus 1s and 2s pauses allow 6s
    let pipeline = slow_answer_pipeline(Duration::from_millis(5500)).await;

    let outcome = pipeline.answer("ownership", &AnswerOptions::search(1)).await.unwrap();
    assert!(matches!(outcome, AnswerOutcome::Answered { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_answer_times_out_past_retry_budget() {
    let pipeline = slow_answer_pipeline(Duration::from_secs(7)).await;

    let result = pipeline.answer("ownership", &AnswerOptions::search(1)).await;
    match result {
        Err(Error::Timeout { limit, .. }) => assert_eq!(limit, Duration::from_secs(6)),
        other => panic!("expected timeout, got {:?}", other.map(|_| ())),
    }
}
