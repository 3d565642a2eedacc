//! Configuration for multi-strategy retrieval.

use serde::{Deserialize, Serialize};

use crate::types::StrategyKind;

/// Weight and depth of one retrieval strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySettings {
    pub kind: StrategyKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base fusion weight, before intent multipliers.
    pub weight: f32,
    /// Candidates requested from the strategy.
    pub top_k: usize,
}

fn default_enabled() -> bool {
    true
}

impl StrategySettings {
    pub fn new(kind: StrategyKind, weight: f32, top_k: usize) -> Self {
        Self {
            kind,
            enabled: true,
            weight,
            top_k,
        }
    }
}

/// Query-rewrite integration for retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteRetrievalConfig {
    /// Run the best rewrites through variant-capable strategies.
    pub enabled: bool,
    /// Number of rewrites used as extra queries.
    pub max_variants: usize,
    /// Multiplier on fusion weights for variant results.
    pub weight_scale: f32,
}

impl Default for RewriteRetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_variants: 2,
            weight_scale: 0.5,
        }
    }
}

/// Multi-strategy retrieval configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub strategies: Vec<StrategySettings>,
    /// RRF smoothing constant.
    pub rrf_k: f32,
    /// Fine ranking looks at `top_k * fine_rank_multiplier` fused candidates.
    pub fine_rank_multiplier: usize,
    /// Per-strategy call timeout.
    pub strategy_timeout_ms: u64,
    pub rewrite: RewriteRetrievalConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            strategies: vec![
                StrategySettings::new(StrategyKind::Semantic, 0.4, 8),
                StrategySettings::new(StrategyKind::Lexical, 0.3, 8),
                StrategySettings::new(StrategyKind::IntentionAware, 0.1, 5),
            ],
            rrf_k: 60.0,
            fine_rank_multiplier: 3,
            strategy_timeout_ms: 5000,
            rewrite: RewriteRetrievalConfig::default(),
        }
    }
}

impl RetrievalConfig {
    /// Default strategies plus exact headword matching.
    pub fn with_exact_match() -> Self {
        let mut config = Self::default();
        config
            .strategies
            .push(StrategySettings::new(StrategyKind::ExactMatch, 0.1, 5));
        config
    }

    /// Vector search only.
    pub fn semantic_only() -> Self {
        Self {
            strategies: vec![StrategySettings::new(StrategyKind::Semantic, 1.0, 10)],
            ..Self::default()
        }
    }

    /// Settings for `kind`, if configured.
    pub fn settings(&self, kind: StrategyKind) -> Option<&StrategySettings> {
        self.strategies.iter().find(|s| s.kind == kind)
    }

    /// Base weight for `kind`, zero when not configured.
    pub fn weight(&self, kind: StrategyKind) -> f32 {
        self.settings(kind).map(|s| s.weight).unwrap_or(0.0)
    }

    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.strategies.iter().any(|s| s.enabled) {
            return Err("at least one retrieval strategy must be enabled");
        }
        for (i, s) in self.strategies.iter().enumerate() {
            if !s.weight.is_finite() || s.weight < 0.0 {
                return Err("strategy weight must be finite and non-negative");
            }
            if s.top_k == 0 {
                return Err("strategy top_k must be at least 1");
            }
            if self.strategies[..i].iter().any(|o| o.kind == s.kind) {
                return Err("each strategy may be configured only once");
            }
        }
        if !self.rrf_k.is_finite() || self.rrf_k <= 0.0 {
            return Err("rrf_k must be positive");
        }
        if self.fine_rank_multiplier == 0 {
            return Err("fine_rank_multiplier must be at least 1");
        }
        if self.strategy_timeout_ms == 0 {
            return Err("strategy_timeout_ms must be positive");
        }
        if !(0.0..=1.0).contains(&self.rewrite.weight_scale) {
            return Err("rewrite weight_scale must be between 0.0 and 1.0");
        }
        Ok(())
    }
}
