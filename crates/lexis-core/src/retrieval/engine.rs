//! The query engine: analysis, intent, retrieval, fusion and fine ranking
//! behind one handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::fine_rank::FineRanker;
use super::fusion::WeightedRrf;
use super::retriever::MultiStrategyRetriever;
use super::strategies::StrategyContext;
use crate::analysis::QueryAnalyzer;
use crate::config::LexisConfig;
use crate::error::{LexisError, LexisResult};
use crate::generation::{build_answer_prompt, ContextAssembler};
use crate::intent::IntentClassifier;
use crate::rerank::{rerank_candidates, RerankedDocument};
use crate::rewrite::QueryRewriter;
use crate::traits::{Embedder, Generator, Reranker, RerankerConfig, VectorIndex};
use crate::types::{
    Candidate, ChunkType, Filter, IntentResult, RankedCandidate, RewriteOutcome, RewriteStrategy,
    StrategyKind,
};

/// A generated answer and what it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub query: String,
    pub intent: IntentResult,
    pub candidates: Vec<RankedCandidate>,
    /// Reranker output, when a reranker is attached.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reranked: Vec<RerankedDocument>,
    pub text: String,
}

/// Stateless per query; holds only injected providers and configuration.
pub struct QueryEngine {
    config: LexisConfig,
    analyzer: QueryAnalyzer,
    classifier: IntentClassifier,
    rewriter: QueryRewriter,
    retriever: MultiStrategyRetriever,
    fusion: WeightedRrf,
    fine_ranker: FineRanker,
    index: Arc<dyn VectorIndex>,
    reranker: Option<(Arc<dyn Reranker>, RerankerConfig)>,
    generator: Option<Arc<dyn Generator>>,
}

impl QueryEngine {
    /// Create an engine over `index`, embedding queries with `embedder`.
    pub fn new(
        config: LexisConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> LexisResult<Self> {
        config.validate()?;
        let retriever = MultiStrategyRetriever::new(&config.retrieval, index.clone(), embedder);
        info!(
            collection = index.collection_name(),
            strategies = config.retrieval.strategies.len(),
            "Query engine ready"
        );
        Ok(Self {
            analyzer: QueryAnalyzer::new()
                .with_stopwords(config.rewriter.custom_stopwords.iter().cloned()),
            classifier: IntentClassifier::new(config.intent.clone()),
            rewriter: QueryRewriter::new(config.rewriter.clone()),
            retriever,
            fusion: WeightedRrf::new(config.retrieval.rrf_k),
            fine_ranker: FineRanker::new(config.retrieval.fine_rank_multiplier),
            index,
            reranker: None,
            generator: None,
            config,
        })
    }

    /// Replace the retriever, e.g. with custom strategies.
    pub fn with_retriever(mut self, retriever: MultiStrategyRetriever) -> Self {
        self.retriever = retriever;
        self
    }

    /// Attach a cross-encoder reranker used by [`QueryEngine::answer`].
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        let config = self.config.reranker.clone().unwrap_or_default();
        self.reranker = Some((reranker, config));
        self
    }

    /// Attach an answer generator.
    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &LexisConfig {
        &self.config
    }

    /// Classify what the query asks and about which term.
    pub fn classify_intent(&self, query: &str) -> IntentResult {
        self.classifier.classify(query)
    }

    /// Rewrite a query; `None` selects the strategy from the query profile.
    pub fn rewrite_query(&self, query: &str, strategy: Option<RewriteStrategy>) -> RewriteOutcome {
        self.rewriter.rewrite(query, strategy)
    }

    /// Ranked candidates for `query`. Never fails: an empty query, an
    /// unavailable index or any other error yields an empty list.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Vec<RankedCandidate> {
        match self.try_retrieve(query, top_k).await {
            Ok(candidates) => candidates,
            Err(e) if e.is_no_results() => {
                debug!(error = %e, "No results");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, code = e.code().as_str(), "Retrieval failed");
                Vec::new()
            }
        }
    }

    /// Like [`QueryEngine::retrieve`], but reports [`LexisError::EmptyQuery`]
    /// and [`LexisError::IndexUnavailable`].
    pub async fn try_retrieve(&self, query: &str, top_k: usize) -> LexisResult<Vec<RankedCandidate>> {
        let profile = self.analyzer.analyze(query);
        if profile.is_terminal() {
            return Err(LexisError::EmptyQuery);
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let intent = self.classifier.classify(&profile.text);
        debug!(
            intent = %intent.intent,
            target = %intent.target_term,
            confidence = intent.confidence,
            "Classified query"
        );

        let rewrite = &self.config.retrieval.rewrite;
        let variants: Vec<String> = if rewrite.enabled {
            self.rewriter
                .rewrite_profile(profile.clone(), None)
                .rewrites
                .into_iter()
                .take(rewrite.max_variants)
                .map(|r| r.query)
                .collect()
        } else {
            Vec::new()
        };

        let ctx = StrategyContext::new(&profile, &intent);
        let results = self
            .retriever
            .retrieve(ctx, &variants, rewrite.weight_scale)
            .await?;

        let retrieval = &self.config.retrieval;
        let fused = self
            .fusion
            .fuse(&results, |kind| retrieval.weight(kind), intent.intent);
        Ok(self.fine_ranker.rank(fused, &intent, top_k))
    }

    /// [`QueryEngine::try_retrieve`] that stops waiting when `token` is
    /// cancelled, returning [`LexisError::Cancelled`].
    pub async fn retrieve_cancellable(
        &self,
        query: &str,
        top_k: usize,
        token: CancellationToken,
    ) -> LexisResult<Vec<RankedCandidate>> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Retrieval cancelled");
                Err(LexisError::Cancelled)
            }
            result = self.try_retrieve(query, top_k) => result,
        }
    }

    /// Chunks whose headword contains `word`, optionally of one chunk type.
    pub async fn lookup(
        &self,
        word: &str,
        chunk_type: Option<ChunkType>,
        limit: usize,
    ) -> LexisResult<Vec<Candidate>> {
        let word = word.trim();
        if word.is_empty() {
            return Err(LexisError::validation_with_suggestion(
                "lookup word is empty",
                "Pass the headword to look up",
            ));
        }
        let mut filter = Filter::contains("word", word);
        if let Some(chunk_type) = chunk_type {
            filter = Filter::and(vec![Filter::eq("chunk_type", chunk_type.as_str()), filter]);
        }
        let hits = self.index.filter_query(&filter, limit).await?;
        Ok(hits
            .into_iter()
            .map(|hit| hit.into_candidate(StrategyKind::ExactMatch, 1.0))
            .collect())
    }

    /// Retrieve, optionally rerank, assemble context and generate an answer.
    pub async fn answer(&self, query: &str, top_k: usize) -> LexisResult<Answer> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            LexisError::Configuration("no generator attached to the query engine".to_string())
        })?;

        let intent = self.classifier.classify(query);
        let candidates = self.retrieve(query, top_k).await;

        let reranked = match &self.reranker {
            Some((reranker, config)) => {
                rerank_candidates(
                    reranker.as_ref(),
                    &config.instruction,
                    query,
                    &candidates,
                    config.top_n,
                )
                .await?
            }
            None => Vec::new(),
        };

        let documents = assemble(&self.config.context, &candidates, &reranked);
        let prompt = build_answer_prompt(query, &intent, &documents);
        let text = generator.generate(&prompt).await?;
        debug!(
            model = generator.model_name(),
            documents = documents.len(),
            "Generated answer"
        );

        Ok(Answer {
            query: query.to_string(),
            intent,
            candidates,
            reranked,
            text,
        })
    }
}

fn assemble(
    assembler: &ContextAssembler,
    candidates: &[RankedCandidate],
    reranked: &[RerankedDocument],
) -> Vec<String> {
    if reranked.is_empty() {
        assembler.assemble(candidates.iter().map(|c| c.content()))
    } else {
        assembler.assemble(reranked.iter().filter_map(|d| d.content.as_deref()))
    }
}
