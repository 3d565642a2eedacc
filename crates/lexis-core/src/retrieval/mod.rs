//! Multi-strategy retrieval.
//!
//! Strategies run concurrently against the corpus index:
//! - Semantic: vector search on an intent-enhanced query
//! - Lexical: keyword filter queries scored by term saturation
//! - Intention-aware: the intent's chunk type for the target word
//! - Exact match: every chunk of the target word (optional)
//!
//! Their ranked lists are merged with intent-weighted RRF and the head of
//! the fused list is re-scored by the fine ranker.

mod config;
mod engine;
mod fine_rank;
mod fusion;
mod retriever;
mod strategies;

pub use config::{RetrievalConfig, RewriteRetrievalConfig, StrategySettings};
pub use engine::{Answer, QueryEngine};
pub use fine_rank::FineRanker;
pub use fusion::{effective_weight, intent_multiplier, WeightedRrf};
pub use retriever::MultiStrategyRetriever;
pub use strategies::{
    build_strategy, intent_adjustment, term_saturation_score, ExactMatchStrategy,
    IntentionAwareStrategy, LexicalStrategy, RetrievalStrategy, SemanticStrategy,
    StrategyContext, EXACT_MATCH_SCORE, INTENTION_AWARE_SCORE,
};
