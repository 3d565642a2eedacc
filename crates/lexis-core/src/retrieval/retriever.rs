//! Concurrent execution of retrieval strategies.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use super::config::{RetrievalConfig, StrategySettings};
use super::strategies::{build_strategy, RetrievalStrategy, StrategyContext};
use crate::error::{LexisError, LexisResult};
use crate::traits::{Embedder, VectorIndex};
use crate::types::StrategyResult;

/// Runs every configured strategy concurrently and collects their results.
///
/// A strategy that errors or exceeds its timeout contributes an empty
/// result; siblings keep running.
pub struct MultiStrategyRetriever {
    strategies: Vec<(StrategySettings, Arc<dyn RetrievalStrategy>)>,
    timeout: Duration,
}

impl MultiStrategyRetriever {
    /// Build the configured strategies over `index` and `embedder`.
    pub fn new(
        config: &RetrievalConfig,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let strategies = config
            .strategies
            .iter()
            .map(|settings| {
                let strategy = build_strategy(settings.kind, index.clone(), embedder.clone());
                (settings.clone(), strategy)
            })
            .collect();
        Self {
            strategies,
            timeout: Duration::from_millis(config.strategy_timeout_ms),
        }
    }

    /// Use caller-supplied strategy implementations.
    pub fn from_strategies(
        strategies: Vec<(StrategySettings, Arc<dyn RetrievalStrategy>)>,
        timeout: Duration,
    ) -> Self {
        Self {
            strategies,
            timeout,
        }
    }

    pub fn settings(&self) -> impl Iterator<Item = &StrategySettings> {
        self.strategies.iter().map(|(settings, _)| settings)
    }

    /// Run all enabled strategies for the original query and, for strategies
    /// that accept them, each query variant at `variant_scale`.
    ///
    /// Returns [`LexisError::IndexUnavailable`] when every strategy that ran
    /// failed or timed out.
    pub async fn retrieve(
        &self,
        ctx: StrategyContext<'_>,
        variants: &[String],
        variant_scale: f32,
    ) -> LexisResult<Vec<StrategyResult>> {
        let mut jobs: Vec<(&dyn RetrievalStrategy, StrategyContext<'_>, usize, Option<f32>)> =
            Vec::new();
        let mut skipped = Vec::new();

        for (settings, strategy) in &self.strategies {
            if !settings.enabled {
                skipped.push(StrategyResult::skipped(settings.kind));
                continue;
            }
            jobs.push((strategy.as_ref(), ctx, settings.top_k, None));
            if strategy.supports_variants() {
                for variant in variants {
                    jobs.push((
                        strategy.as_ref(),
                        ctx.with_query(variant),
                        settings.top_k,
                        Some(variant_scale),
                    ));
                }
            }
        }

        let runs = jobs
            .into_iter()
            .map(|(strategy, ctx, top_k, scale)| self.run_one(strategy, ctx, top_k, scale));
        let mut results = join_all(runs).await;
        let executed = results.len();
        let failures = results.iter().filter(|r| r.is_failure()).count();
        results.extend(skipped);

        debug!(
            executed,
            failures,
            candidates = results.iter().map(|r| r.candidates.len()).sum::<usize>(),
            "Strategies finished"
        );

        if executed > 0 && failures == executed {
            return Err(LexisError::index_unavailable(format!(
                "all {executed} retrieval strategies failed"
            )));
        }
        Ok(results)
    }

    async fn run_one(
        &self,
        strategy: &dyn RetrievalStrategy,
        ctx: StrategyContext<'_>,
        top_k: usize,
        variant_scale: Option<f32>,
    ) -> StrategyResult {
        let kind = strategy.kind();
        let result = match tokio::time::timeout(self.timeout, strategy.retrieve(&ctx, top_k)).await
        {
            Ok(Ok(candidates)) => StrategyResult::completed(kind, candidates),
            Ok(Err(e)) => {
                warn!(strategy = %kind, error = %e, "Retrieval strategy failed");
                StrategyResult::failed(kind, e.to_string())
            }
            Err(_) => {
                let e = LexisError::StrategyTimeout {
                    strategy: kind.to_string(),
                    timeout_ms: self.timeout.as_millis() as u64,
                };
                warn!(strategy = %kind, error = %e, "Retrieval strategy timed out");
                StrategyResult::timed_out(kind)
            }
        };
        match variant_scale {
            Some(scale) => result.for_variant(ctx.query, scale),
            None => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QueryAnalyzer;
    use crate::types::{
        Candidate, DetectionMethod, Intent, IntentResult, StrategyKind, StrategyStatus,
    };
    use async_trait::async_trait;

    enum Behaviour {
        Return(Vec<&'static str>),
        Fail,
        Hang,
    }

    struct FakeStrategy {
        kind: StrategyKind,
        behaviour: Behaviour,
        variants: bool,
    }

    #[async_trait]
    impl RetrievalStrategy for FakeStrategy {
        fn kind(&self) -> StrategyKind {
            self.kind
        }

        async fn retrieve(
            &self,
            ctx: &StrategyContext<'_>,
            _top_k: usize,
        ) -> LexisResult<Vec<Candidate>> {
            match &self.behaviour {
                Behaviour::Return(ids) => Ok(ids
                    .iter()
                    .map(|id| Candidate {
                        id: id.to_string(),
                        content: ctx.query.to_string(),
                        word: "w".to_string(),
                        chunk_type: "definition".to_string(),
                        strategy: self.kind,
                        score: 0.5,
                    })
                    .collect()),
                Behaviour::Fail => Err(LexisError::vector_store("boom")),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Vec::new())
                }
            }
        }

        fn supports_variants(&self) -> bool {
            self.variants
        }
    }

    fn fake(kind: StrategyKind, behaviour: Behaviour) -> (StrategySettings, Arc<dyn RetrievalStrategy>) {
        (
            StrategySettings::new(kind, 0.5, 5),
            Arc::new(FakeStrategy {
                kind,
                behaviour,
                variants: kind == StrategyKind::Semantic,
            }),
        )
    }

    fn intent() -> IntentResult {
        IntentResult::new(Intent::Definition, "happy", 0.9, DetectionMethod::Keyword)
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let retriever = MultiStrategyRetriever::from_strategies(
            vec![
                fake(StrategyKind::Semantic, Behaviour::Return(vec!["a", "b"])),
                fake(StrategyKind::Lexical, Behaviour::Fail),
            ],
            Duration::from_millis(200),
        );
        let profile = QueryAnalyzer::new().analyze("happy");
        let intent = intent();
        let results = retriever
            .retrieve(StrategyContext::new(&profile, &intent), &[], 0.5)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].candidates.len(), 2);
        assert!(matches!(results[1].status, StrategyStatus::Failed(_)));
        assert!(results[1].candidates.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_does_not_block_siblings() {
        let retriever = MultiStrategyRetriever::from_strategies(
            vec![
                fake(StrategyKind::Semantic, Behaviour::Hang),
                fake(StrategyKind::Lexical, Behaviour::Return(vec!["a"])),
            ],
            Duration::from_millis(50),
        );
        let profile = QueryAnalyzer::new().analyze("happy");
        let intent = intent();
        let results = retriever
            .retrieve(StrategyContext::new(&profile, &intent), &[], 0.5)
            .await
            .unwrap();

        assert_eq!(results[0].status, StrategyStatus::TimedOut);
        assert_eq!(results[1].candidates.len(), 1);
    }

    #[tokio::test]
    async fn test_all_failed_is_index_unavailable() {
        let retriever = MultiStrategyRetriever::from_strategies(
            vec![
                fake(StrategyKind::Semantic, Behaviour::Fail),
                fake(StrategyKind::Lexical, Behaviour::Hang),
            ],
            Duration::from_millis(50),
        );
        let profile = QueryAnalyzer::new().analyze("happy");
        let intent = intent();
        let err = retriever
            .retrieve(StrategyContext::new(&profile, &intent), &[], 0.5)
            .await
            .unwrap_err();
        assert!(matches!(err, LexisError::IndexUnavailable { .. }));
        assert!(err.is_no_results());
    }

    #[tokio::test]
    async fn test_variants_and_skipped() {
        let mut lexical = fake(StrategyKind::Lexical, Behaviour::Return(vec!["c"]));
        lexical.0.enabled = false;
        let retriever = MultiStrategyRetriever::from_strategies(
            vec![
                fake(StrategyKind::Semantic, Behaviour::Return(vec!["a"])),
                fake(StrategyKind::IntentionAware, Behaviour::Return(vec!["b"])),
                lexical,
            ],
            Duration::from_millis(200),
        );
        let profile = QueryAnalyzer::new().analyze("happy");
        let intent = intent();
        let variants = vec!["happy 的定义".to_string()];
        let results = retriever
            .retrieve(StrategyContext::new(&profile, &intent), &variants, 0.5)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        let variant = results
            .iter()
            .find(|r| r.variant.is_some())
            .unwrap();
        assert_eq!(variant.strategy, StrategyKind::Semantic);
        assert_eq!(variant.weight_scale, 0.5);
        assert_eq!(variant.candidates[0].content, "happy 的定义");
        assert_eq!(results[3].status, StrategyStatus::Skipped);
    }
}
