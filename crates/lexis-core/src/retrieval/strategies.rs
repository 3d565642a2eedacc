//! Retrieval strategies over the corpus index.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::analysis::lexicon::count_term;
use crate::error::{LexisError, LexisResult};
use crate::traits::{Embedder, IndexHit, VectorIndex};
use crate::types::{Candidate, Filter, IntentResult, QueryProfile, StrategyKind};

/// Maximum keywords the lexical strategy queries for.
const MAX_LEXICAL_KEYWORDS: usize = 5;

/// Score given to every intention-aware hit.
pub const INTENTION_AWARE_SCORE: f32 = 1.0;

/// Score given to every exact-match hit.
pub const EXACT_MATCH_SCORE: f32 = 0.9;

/// What a strategy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext<'a> {
    /// The query text to run, either the original or a rewrite.
    pub query: &'a str,
    /// Analysis of the original query.
    pub profile: &'a QueryProfile,
    pub intent: &'a IntentResult,
}

impl<'a> StrategyContext<'a> {
    pub fn new(profile: &'a QueryProfile, intent: &'a IntentResult) -> Self {
        Self {
            query: &profile.text,
            profile,
            intent,
        }
    }

    /// The same context running a different query text.
    pub fn with_query(self, query: &'a str) -> Self {
        Self { query, ..self }
    }
}

/// One independent way of retrieving candidates.
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Ranked candidates, best first, at most `top_k`.
    async fn retrieve(&self, ctx: &StrategyContext<'_>, top_k: usize)
        -> LexisResult<Vec<Candidate>>;

    /// Whether the strategy uses the query text, and so benefits from rewrites.
    fn supports_variants(&self) -> bool {
        false
    }
}

/// Bonus for a candidate that suits the recognized intent: +0.3 for the
/// target headword, +0.4 for the intent's chunk type, +0.2 for an intent
/// marker in the content.
pub fn intent_adjustment(candidate: &Candidate, intent: &IntentResult) -> f32 {
    let mut bonus = 0.0;
    if candidate.word_matches(&intent.target_term) {
        bonus += 0.3;
    }
    if let Some(chunk_type) = intent.intent.expected_chunk_type() {
        if candidate.is_chunk_type(chunk_type) {
            bonus += 0.4;
        }
    }
    if has_density_marker(&candidate.content, intent) {
        bonus += 0.2;
    }
    bonus
}

pub(crate) fn has_density_marker(content: &str, intent: &IntentResult) -> bool {
    let lower = content.to_lowercase();
    intent
        .intent
        .density_markers()
        .iter()
        .any(|marker| lower.contains(marker))
}

/// Term saturation score: each term adds `n / (n + 1.5)` for `n` occurrences
/// in the content, capped at 1.0.
pub fn term_saturation_score(content: &str, terms: &[String]) -> f32 {
    if content.is_empty() || terms.is_empty() {
        return 0.0;
    }
    let score: f32 = terms
        .iter()
        .map(|term| {
            let n = count_term(content, term) as f32;
            n / (n + 1.5)
        })
        .sum();
    score.min(1.0)
}

/// Corpus headwords are stored lowercase, so word filters match on the
/// lowercased term.
fn headword_filter(term: &str) -> Filter {
    Filter::eq("word", term.trim().to_lowercase())
}

fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        OrderedFloat(b.score)
            .cmp(&OrderedFloat(a.score))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Vector search on an intent-enhanced query.
pub struct SemanticStrategy {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl SemanticStrategy {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }

    /// The query with intent cue words appended, when a target term is known.
    pub fn enhanced_query(query: &str, intent: &IntentResult) -> String {
        match intent.intent.query_cues() {
            Some(cues) if intent.has_target() => format!("{query} {cues}"),
            _ => query.to_string(),
        }
    }
}

#[async_trait]
impl RetrievalStrategy for SemanticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Semantic
    }

    async fn retrieve(
        &self,
        ctx: &StrategyContext<'_>,
        top_k: usize,
    ) -> LexisResult<Vec<Candidate>> {
        let text = Self::enhanced_query(ctx.query, ctx.intent);
        let vector = self.embedder.embed(&text).await?;
        let hits = self.index.semantic_search(&vector, top_k).await?;

        let mut candidates: Vec<Candidate> = hits
            .into_iter()
            .map(|hit| {
                let similarity = if hit.score.is_finite() {
                    hit.score.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let mut candidate = hit.into_candidate(StrategyKind::Semantic, similarity);
                candidate.score = (similarity + intent_adjustment(&candidate, ctx.intent)).min(1.0);
                candidate
            })
            .collect();
        sort_by_score(&mut candidates);
        candidates.truncate(top_k);

        debug!(query = %text, hits = candidates.len(), "Semantic retrieval");
        Ok(candidates)
    }

    fn supports_variants(&self) -> bool {
        true
    }
}

/// Keyword filter queries scored by term saturation.
pub struct LexicalStrategy {
    index: Arc<dyn VectorIndex>,
}

impl LexicalStrategy {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }

    /// The target term alone, or the query's first key terms.
    pub fn keywords(ctx: &StrategyContext<'_>) -> Vec<String> {
        if ctx.intent.has_target() {
            return vec![ctx.intent.target_term.clone()];
        }
        ctx.profile
            .key_terms
            .iter()
            .take(MAX_LEXICAL_KEYWORDS)
            .cloned()
            .collect()
    }

    fn keyword_filter(keyword: &str, intent: &IntentResult) -> Filter {
        let word = headword_filter(keyword);
        match intent.intent.expected_chunk_type() {
            Some(chunk_type) => Filter::and(vec![Filter::eq("chunk_type", chunk_type.as_str()), word]),
            None => word,
        }
    }
}

#[async_trait]
impl RetrievalStrategy for LexicalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Lexical
    }

    async fn retrieve(
        &self,
        ctx: &StrategyContext<'_>,
        top_k: usize,
    ) -> LexisResult<Vec<Candidate>> {
        let keywords = Self::keywords(ctx);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let per_keyword = top_k / keywords.len() + 1;

        let mut hits: Vec<IndexHit> = Vec::new();
        let mut last_error: Option<LexisError> = None;
        let mut succeeded = 0usize;
        for keyword in &keywords {
            let filter = Self::keyword_filter(keyword, ctx.intent);
            match self.index.filter_query(&filter, per_keyword).await {
                Ok(found) => {
                    succeeded += 1;
                    hits.extend(found);
                }
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "Keyword query failed");
                    last_error = Some(e);
                }
            }
        }
        if succeeded == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        let terms = &ctx.profile.key_terms;
        let mut best: HashMap<String, Candidate> = HashMap::new();
        for hit in hits {
            let score = term_saturation_score(&hit.content, terms);
            match best.get(&hit.id) {
                Some(existing) if existing.score >= score => {}
                _ => {
                    best.insert(hit.id.clone(), hit.into_candidate(StrategyKind::Lexical, score));
                }
            }
        }

        let mut candidates: Vec<Candidate> = best.into_values().collect();
        sort_by_score(&mut candidates);
        candidates.truncate(top_k);
        debug!(keywords = ?keywords, hits = candidates.len(), "Lexical retrieval");
        Ok(candidates)
    }
}

/// The intent's chunk type for the target word.
pub struct IntentionAwareStrategy {
    index: Arc<dyn VectorIndex>,
}

impl IntentionAwareStrategy {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl RetrievalStrategy for IntentionAwareStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::IntentionAware
    }

    async fn retrieve(
        &self,
        ctx: &StrategyContext<'_>,
        top_k: usize,
    ) -> LexisResult<Vec<Candidate>> {
        let Some(chunk_type) = ctx.intent.intent.expected_chunk_type() else {
            return Ok(Vec::new());
        };
        if !ctx.intent.has_target() {
            return Ok(Vec::new());
        }

        let filter = Filter::and(vec![
            Filter::eq("chunk_type", chunk_type.as_str()),
            headword_filter(&ctx.intent.target_term),
        ]);
        let hits = self.index.filter_query(&filter, top_k).await?;
        Ok(hits
            .into_iter()
            .take(top_k)
            .map(|hit| hit.into_candidate(StrategyKind::IntentionAware, INTENTION_AWARE_SCORE))
            .collect())
    }
}

/// Every chunk whose headword equals the target term.
pub struct ExactMatchStrategy {
    index: Arc<dyn VectorIndex>,
}

impl ExactMatchStrategy {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl RetrievalStrategy for ExactMatchStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExactMatch
    }

    async fn retrieve(
        &self,
        ctx: &StrategyContext<'_>,
        top_k: usize,
    ) -> LexisResult<Vec<Candidate>> {
        if !ctx.intent.has_target() {
            return Ok(Vec::new());
        }
        let filter = headword_filter(&ctx.intent.target_term);
        let hits = self.index.filter_query(&filter, top_k).await?;
        Ok(hits
            .into_iter()
            .take(top_k)
            .map(|hit| hit.into_candidate(StrategyKind::ExactMatch, EXACT_MATCH_SCORE))
            .collect())
    }
}

/// Build the strategy implementation for `kind`.
pub fn build_strategy(
    kind: StrategyKind,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
) -> Arc<dyn RetrievalStrategy> {
    match kind {
        StrategyKind::Semantic => Arc::new(SemanticStrategy::new(index, embedder)),
        StrategyKind::Lexical => Arc::new(LexicalStrategy::new(index)),
        StrategyKind::IntentionAware => Arc::new(IntentionAwareStrategy::new(index)),
        StrategyKind::ExactMatch => Arc::new(ExactMatchStrategy::new(index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QueryAnalyzer;
    use crate::types::{DetectionMethod, Intent};
    use std::sync::Mutex;

    fn hit(id: &str, word: &str, chunk_type: &str, content: &str, score: f32) -> IndexHit {
        IndexHit {
            id: id.to_string(),
            content: content.to_string(),
            word: word.to_string(),
            chunk_type: chunk_type.to_string(),
            score,
        }
    }

    struct MockIndex {
        records: Vec<IndexHit>,
        filters: Mutex<Vec<Filter>>,
        fail: bool,
    }

    impl MockIndex {
        fn new(records: Vec<IndexHit>) -> Self {
            Self {
                records,
                filters: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                records: Vec::new(),
                filters: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn semantic_search(&self, _vector: &[f32], limit: usize) -> LexisResult<Vec<IndexHit>> {
            if self.fail {
                return Err(LexisError::vector_store("down"));
            }
            Ok(self.records.iter().take(limit).cloned().collect())
        }

        async fn filter_query(&self, filter: &Filter, limit: usize) -> LexisResult<Vec<IndexHit>> {
            if self.fail {
                return Err(LexisError::vector_store("down"));
            }
            self.filters.lock().unwrap().push(filter.clone());
            Ok(self
                .records
                .iter()
                .filter(|r| {
                    filter.evaluate(&|field: &str| match field {
                        "word" => Some(r.word.as_str()),
                        "chunk_type" => Some(r.chunk_type.as_str()),
                        "content" => Some(r.content.as_str()),
                        _ => None,
                    })
                })
                .take(limit)
                .cloned()
                .collect())
        }

        fn collection_name(&self) -> &str {
            "mock"
        }
    }

    struct MockEmbedder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, text: &str) -> LexisResult<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(vec![1.0, 0.0])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    fn corpus() -> Vec<IndexHit> {
        vec![
            hit("d1", "happy", "definition", "happy 释义: 快乐的", 0.3),
            hit("s1", "happy", "semantic_network", "happy 同近义词: glad: cheerful", 0.2),
            hit("e1", "happy", "examples", "例句: I am happy. happy days", 0.25),
            hit("x1", "sad", "semantic_network", "sad 同近义词: unhappy", 0.1),
        ]
    }

    fn synonym_intent() -> IntentResult {
        IntentResult::new(Intent::Synonym, "happy", 0.9, DetectionMethod::Keyword)
    }

    #[test]
    fn test_intent_adjustment() {
        let intent = synonym_intent();
        let candidate = corpus()[1].clone().into_candidate(StrategyKind::Semantic, 0.0);
        assert!((intent_adjustment(&candidate, &intent) - 0.9).abs() < 1e-6);

        let other = corpus()[0].clone().into_candidate(StrategyKind::Semantic, 0.0);
        assert!((intent_adjustment(&other, &intent) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_term_saturation_score() {
        let terms = vec!["happy".to_string()];
        assert!((term_saturation_score("happy", &terms) - 0.4).abs() < 1e-6);
        assert!((term_saturation_score("happy happy", &terms) - 2.0 / 3.5).abs() < 1e-6);
        assert_eq!(term_saturation_score("sad", &terms), 0.0);
        let many: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(term_saturation_score("a a a b b b c c c", &many), 1.0);
    }

    #[test]
    fn test_enhanced_query_requires_target() {
        let mut intent = synonym_intent();
        assert!(SemanticStrategy::enhanced_query("q", &intent).contains("synonyms"));
        intent.target_term.clear();
        assert_eq!(SemanticStrategy::enhanced_query("q", &intent), "q");
    }

    #[tokio::test]
    async fn test_semantic_strategy_reorders_by_intent() {
        let index = Arc::new(MockIndex::new(corpus()));
        let embedder = Arc::new(MockEmbedder {
            seen: Mutex::new(Vec::new()),
        });
        let strategy = SemanticStrategy::new(index, embedder.clone());
        let profile = QueryAnalyzer::new().analyze("happy的同义词");
        let intent = synonym_intent();
        let ctx = StrategyContext::new(&profile, &intent);

        let candidates = strategy.retrieve(&ctx, 4).await.unwrap();
        assert_eq!(candidates[0].id, "s1");
        assert!(candidates.iter().all(|c| c.score <= 1.0));
        assert!(embedder.seen.lock().unwrap()[0].ends_with("similar words"));
    }

    #[tokio::test]
    async fn test_lexical_strategy_scopes_by_chunk_type() {
        let index = Arc::new(MockIndex::new(corpus()));
        let strategy = LexicalStrategy::new(index.clone());
        let profile = QueryAnalyzer::new().analyze("happy的同义词");
        let intent = synonym_intent();
        let ctx = StrategyContext::new(&profile, &intent);

        let candidates = strategy.retrieve(&ctx, 8).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "s1");
        assert_eq!(index.filters.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lexical_strategy_without_target_uses_key_terms() {
        let index = Arc::new(MockIndex::new(corpus()));
        let strategy = LexicalStrategy::new(index);
        let profile = QueryAnalyzer::new().analyze("happy sad");
        let intent = IntentResult::new(Intent::General, "", 0.3, DetectionMethod::Pattern);
        let ctx = StrategyContext::new(&profile, &intent);

        let candidates = strategy.retrieve(&ctx, 8).await.unwrap();
        assert_eq!(candidates.len(), 4);
        let mut ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_lexical_strategy_propagates_total_failure() {
        let strategy = LexicalStrategy::new(Arc::new(MockIndex::failing()));
        let profile = QueryAnalyzer::new().analyze("happy的同义词");
        let intent = synonym_intent();
        let ctx = StrategyContext::new(&profile, &intent);
        assert!(strategy.retrieve(&ctx, 8).await.is_err());
    }

    #[tokio::test]
    async fn test_intention_aware_strategy() {
        let strategy = IntentionAwareStrategy::new(Arc::new(MockIndex::new(corpus())));
        let profile = QueryAnalyzer::new().analyze("happy的同义词");
        let intent = synonym_intent();
        let ctx = StrategyContext::new(&profile, &intent);
        let candidates = strategy.retrieve(&ctx, 5).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].score, INTENTION_AWARE_SCORE);

        let general = IntentResult::new(Intent::General, "happy", 0.5, DetectionMethod::Pattern);
        let ctx = StrategyContext::new(&profile, &general);
        assert!(strategy.retrieve(&ctx, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_match_strategy() {
        let strategy = ExactMatchStrategy::new(Arc::new(MockIndex::new(corpus())));
        let profile = QueryAnalyzer::new().analyze("happy");
        let intent = IntentResult::new(Intent::General, "happy", 0.5, DetectionMethod::Pattern);
        let ctx = StrategyContext::new(&profile, &intent);
        let candidates = strategy.retrieve(&ctx, 5).await.unwrap();
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.score == EXACT_MATCH_SCORE));
    }

    #[tokio::test]
    async fn test_capitalized_target_matches_lowercase_headword() {
        let index = Arc::new(MockIndex::new(corpus()));
        let profile = QueryAnalyzer::new().analyze("Happy的同义词");
        let intent = IntentResult::new(Intent::Synonym, "Happy", 0.9, DetectionMethod::Keyword);
        let ctx = StrategyContext::new(&profile, &intent);

        let aware = IntentionAwareStrategy::new(index.clone());
        let candidates = aware.retrieve(&ctx, 5).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "s1");

        let exact = ExactMatchStrategy::new(index.clone());
        assert_eq!(exact.retrieve(&ctx, 5).await.unwrap().len(), 3);

        let lexical = LexicalStrategy::new(index.clone());
        assert_eq!(lexical.retrieve(&ctx, 5).await.unwrap().len(), 1);
        assert!(index
            .filters
            .lock()
            .unwrap()
            .iter()
            .all(|f| !format!("{:?}", f).contains("Happy")));
    }
}
