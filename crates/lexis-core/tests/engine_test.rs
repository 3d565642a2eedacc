//! Integration tests for the query engine over an in-memory corpus.

use async_trait::async_trait;
use lexis_core::traits::{cosine_similarity, RankedDocument};
use lexis_core::{
    ChunkType, Embedder, Filter, Generator, Intent, IndexHit, LexisConfig, LexisError,
    LexisResult, QueryEngine, Reranker, RewriteStrategy, VectorIndex,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

struct Record {
    hit: IndexHit,
    vector: Vec<f32>,
}

struct CorpusIndex {
    records: Vec<Record>,
    broken: bool,
}

impl CorpusIndex {
    fn sample() -> Self {
        let record = |id: &str, word: &str, chunk_type: &str, content: &str, vector: [f32; 2]| Record {
            hit: IndexHit {
                id: id.to_string(),
                content: content.to_string(),
                word: word.to_string(),
                chunk_type: chunk_type.to_string(),
                score: 0.0,
            },
            vector: vector.to_vec(),
        };
        Self {
            records: vec![
                record("sensible_def", "sensible", "definition", "sensible 释义: adj. 明智的；合理的", [0.9, 0.1]),
                record("sensible_syn", "sensible", "semantic_network", "sensible 同近义词: wise: reasonable: practical", [0.5, 0.5]),
                record("sensible_ex", "sensible", "examples", "例句: It was a sensible decision.", [0.7, 0.3]),
                record("sensitive_def", "sensitive", "definition", "sensitive 释义: adj. 敏感的", [1.0, 0.0]),
            ],
            broken: false,
        }
    }

    fn broken() -> Self {
        Self {
            records: Vec::new(),
            broken: true,
        }
    }
}

#[async_trait]
impl VectorIndex for CorpusIndex {
    async fn semantic_search(&self, vector: &[f32], limit: usize) -> LexisResult<Vec<IndexHit>> {
        if self.broken {
            return Err(LexisError::vector_store("connection refused"));
        }
        let mut hits: Vec<IndexHit> = self
            .records
            .iter()
            .map(|r| IndexHit {
                score: cosine_similarity(vector, &r.vector),
                ..r.hit.clone()
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn filter_query(&self, filter: &Filter, limit: usize) -> LexisResult<Vec<IndexHit>> {
        if self.broken {
            return Err(LexisError::vector_store("connection refused"));
        }
        Ok(self
            .records
            .iter()
            .filter(|r| {
                filter.evaluate(&|field: &str| match field {
                    "word" => Some(r.hit.word.as_str()),
                    "chunk_type" => Some(r.hit.chunk_type.as_str()),
                    "content" => Some(r.hit.content.as_str()),
                    _ => None,
                })
            })
            .take(limit)
            .map(|r| IndexHit {
                score: 1.0,
                ..r.hit.clone()
            })
            .collect())
    }

    fn collection_name(&self) -> &str {
        "test_vocabulary"
    }
}

struct FixedEmbedder;

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> LexisResult<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    fn dimension(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}

struct EchoGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> LexisResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(prompt.to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

struct FirstOnlyReranker;

#[async_trait]
impl Reranker for FirstOnlyReranker {
    async fn rank(
        &self,
        _query: &str,
        _documents: &[String],
        _top_k: usize,
    ) -> LexisResult<Vec<RankedDocument>> {
        Ok(vec![RankedDocument {
            corpus_id: 0,
            score: 0.99,
        }])
    }

    fn model_name(&self) -> &str {
        "first-only"
    }
}

fn engine_with(index: CorpusIndex, config: LexisConfig) -> QueryEngine {
    QueryEngine::new(config, Arc::new(index), Arc::new(FixedEmbedder)).unwrap()
}

fn engine() -> QueryEngine {
    engine_with(CorpusIndex::sample(), LexisConfig::default())
}

#[tokio::test]
async fn test_synonym_query_ranks_semantic_network_first() {
    let results = engine().retrieve("sensible的同义词有哪些", 3).await;

    assert!(!results.is_empty());
    assert!(results.len() <= 3);
    assert_eq!(results[0].id(), "sensible_syn");
    assert!(results[0].strategy_scores.len() >= 2);
    assert!(results
        .windows(2)
        .all(|w| w[0].final_score >= w[1].final_score));
}

#[tokio::test]
async fn test_retrieve_is_deterministic_and_deduplicated() {
    let engine = engine();
    let first = engine.retrieve("sensible的同义词有哪些", 10).await;
    let second = engine.retrieve("sensible的同义词有哪些", 10).await;
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    let mut ids = HashSet::new();
    assert!(first.iter().all(|c| ids.insert(c.id().to_string())));
}

#[tokio::test]
async fn test_empty_query_short_circuits() {
    let engine = engine();
    assert!(engine.retrieve("   ", 5).await.is_empty());
    let err = engine.try_retrieve("", 5).await.unwrap_err();
    assert!(matches!(err, LexisError::EmptyQuery));
}

#[tokio::test]
async fn test_broken_index_degrades_to_empty() {
    let engine = engine_with(CorpusIndex::broken(), LexisConfig::default());
    assert!(engine.retrieve("sensible的同义词有哪些", 5).await.is_empty());

    let err = engine
        .try_retrieve("sensible的同义词有哪些", 5)
        .await
        .unwrap_err();
    assert!(matches!(err, LexisError::IndexUnavailable { .. }));
}

#[tokio::test]
async fn test_classify_intent_scenarios() {
    let engine = engine();
    let result = engine.classify_intent("什么是 sensible");
    assert_eq!(result.intent, Intent::Definition);
    assert_eq!(result.target_term, "sensible");

    let quoted = engine.classify_intent("What is the meaning of \"ephemeral\"?");
    assert_eq!(quoted.target_term, "ephemeral");

    let empty = engine.classify_intent("");
    assert_eq!(empty.intent, Intent::General);
    assert_eq!(empty.confidence, 0.0);
}

#[tokio::test]
async fn test_rewrite_query_reports_strategy() {
    let outcome = engine().rewrite_query("sensible的定义", None);
    assert_eq!(outcome.strategy, Some(RewriteStrategy::Expand));
    assert!(!outcome.rewrites.is_empty());
    assert_eq!(outcome.original_query, "sensible的定义");
}

#[tokio::test]
async fn test_rewrite_variants_keep_ids_unique() {
    let mut config = LexisConfig::default();
    config.retrieval.rewrite.enabled = true;
    let engine = engine_with(CorpusIndex::sample(), config);

    let results = engine.retrieve("sensible的定义", 10).await;
    assert!(!results.is_empty());
    let mut ids = HashSet::new();
    assert!(results.iter().all(|c| ids.insert(c.id().to_string())));
}

#[tokio::test]
async fn test_cancelled_retrieval() {
    let token = CancellationToken::new();
    token.cancel();
    let err = engine()
        .retrieve_cancellable("sensible的同义词有哪些", 5, token)
        .await
        .unwrap_err();
    assert!(matches!(err, LexisError::Cancelled));
}

#[tokio::test]
async fn test_uncancelled_retrieval_completes() {
    let results = engine()
        .retrieve_cancellable("sensible的同义词有哪些", 5, CancellationToken::new())
        .await
        .unwrap();
    assert!(!results.is_empty());
}

#[tokio::test]
async fn test_lookup_by_word_and_chunk_type() {
    let engine = engine();
    let all = engine.lookup("sensi", None, 10).await.unwrap();
    assert_eq!(all.len(), 4);

    let examples = engine
        .lookup("sensible", Some(ChunkType::Examples), 10)
        .await
        .unwrap();
    assert_eq!(examples.len(), 1);
    assert_eq!(examples[0].id, "sensible_ex");

    assert!(engine.lookup(" ", None, 10).await.is_err());
}

#[tokio::test]
async fn test_answer_requires_generator() {
    let err = engine().answer("sensible的同义词有哪些", 3).await.unwrap_err();
    assert!(matches!(err, LexisError::Configuration(_)));
}

#[tokio::test]
async fn test_answer_with_reranker_and_generator() {
    let generator = Arc::new(EchoGenerator {
        calls: AtomicUsize::new(0),
    });
    let engine = engine()
        .with_generator(generator.clone())
        .with_reranker(Arc::new(FirstOnlyReranker));

    let answer = engine.answer("sensible的同义词有哪些", 3).await.unwrap();
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    assert_eq!(answer.intent.intent, Intent::Synonym);
    assert_eq!(answer.reranked.len(), 1);
    assert!(answer.text.contains("[1] sensible 同近义词"));
    assert!(!answer.text.contains("[2]"));
}
