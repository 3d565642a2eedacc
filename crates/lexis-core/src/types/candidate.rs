//! Retrieval candidates, per-strategy results and fused records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::ChunkType;

/// Retrieval strategies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Vector similarity over embeddings.
    Semantic,
    /// Keyword filter queries scored by term saturation.
    #[serde(alias = "keyword_bm25")]
    #[strum(to_string = "lexical", serialize = "keyword_bm25")]
    Lexical,
    /// The intent's chunk type for the target word.
    #[serde(alias = "intent_specific")]
    #[strum(to_string = "intention_aware", serialize = "intent_specific")]
    IntentionAware,
    /// Target word equality across every chunk type.
    ExactMatch,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// One retrieved corpus chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub content: String,
    /// Headword the chunk belongs to.
    pub word: String,
    /// Chunk type label as stored in the corpus.
    pub chunk_type: String,
    /// Strategy that produced this copy of the chunk.
    pub strategy: StrategyKind,
    /// Strategy-local score in [0, 1].
    pub score: f32,
}

impl Candidate {
    pub fn is_chunk_type(&self, chunk_type: ChunkType) -> bool {
        self.chunk_type == chunk_type.as_str()
    }

    /// Case-insensitive headword comparison.
    pub fn word_matches(&self, term: &str) -> bool {
        !term.is_empty() && self.word.to_lowercase() == term.to_lowercase()
    }
}

/// How a strategy run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum StrategyStatus {
    Completed,
    Failed(String),
    TimedOut,
    Skipped,
}

/// Ranked output of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: StrategyKind,
    /// Candidates in rank order.
    pub candidates: Vec<Candidate>,
    pub status: StrategyStatus,
    /// Multiplier on the strategy's fusion weight. Below 1.0 for rewrites.
    pub weight_scale: f32,
    /// The query variant this run used, when it was not the original query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
}

impl StrategyResult {
    pub fn completed(strategy: StrategyKind, candidates: Vec<Candidate>) -> Self {
        Self {
            strategy,
            candidates,
            status: StrategyStatus::Completed,
            weight_scale: 1.0,
            variant: None,
        }
    }

    pub fn failed(strategy: StrategyKind, reason: impl Into<String>) -> Self {
        Self {
            strategy,
            candidates: Vec::new(),
            status: StrategyStatus::Failed(reason.into()),
            weight_scale: 1.0,
            variant: None,
        }
    }

    pub fn timed_out(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            candidates: Vec::new(),
            status: StrategyStatus::TimedOut,
            weight_scale: 1.0,
            variant: None,
        }
    }

    pub fn skipped(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            candidates: Vec::new(),
            status: StrategyStatus::Skipped,
            weight_scale: 1.0,
            variant: None,
        }
    }

    /// Attach a query variant and its weight scale.
    pub fn for_variant(mut self, variant: impl Into<String>, weight_scale: f32) -> Self {
        self.variant = Some(variant.into());
        self.weight_scale = weight_scale;
        self
    }

    /// Whether the strategy failed to consult the index.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            StrategyStatus::Failed(_) | StrategyStatus::TimedOut
        )
    }
}

/// A candidate after weighted reciprocal rank fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionRecord {
    pub candidate: Candidate,
    pub fused_score: f32,
    /// Contribution of each strategy to `fused_score`.
    pub strategy_scores: BTreeMap<StrategyKind, f32>,
}

/// Final retrieval output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub fused_score: f32,
    /// Score after intent-aware fine ranking.
    pub final_score: f32,
    pub strategy_scores: BTreeMap<StrategyKind, f32>,
}

impl RankedCandidate {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }

    pub fn content(&self) -> &str {
        &self.candidate.content
    }
}
