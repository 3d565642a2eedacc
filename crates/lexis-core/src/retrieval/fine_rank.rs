//! Intent-aware re-scoring of fused candidates.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::strategies::has_density_marker;
use crate::types::{Candidate, FusionRecord, IntentResult, RankedCandidate};

/// Re-scores the head of the fused list and truncates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineRanker {
    /// How many fused candidates per requested result are re-scored.
    pub multiplier: usize,
}

impl Default for FineRanker {
    fn default() -> Self {
        Self { multiplier: 3 }
    }
}

impl FineRanker {
    pub fn new(multiplier: usize) -> Self {
        Self {
            multiplier: multiplier.max(1),
        }
    }

    /// Score added to a candidate's fused score.
    ///
    /// +0.3 target headword, +0.4 expected chunk type, up to +0.2 for
    /// intent markers and list separators, +0.1 for 50..=500 characters of
    /// content or -0.1 beyond 1000.
    pub fn adjustment(candidate: &Candidate, intent: &IntentResult) -> f32 {
        let mut adjustment = 0.0;
        if candidate.word_matches(&intent.target_term) {
            adjustment += 0.3;
        }
        if let Some(chunk_type) = intent.intent.expected_chunk_type() {
            if candidate.is_chunk_type(chunk_type) {
                adjustment += 0.4;
            }
        }
        adjustment += density_bonus(&candidate.content, intent);

        let length = candidate.content.chars().count();
        if (50..=500).contains(&length) {
            adjustment += 0.1;
        } else if length > 1000 {
            adjustment -= 0.1;
        }
        adjustment
    }

    /// Re-score the first `top_k * multiplier` records and keep the best
    /// `top_k`. Ties are broken by candidate id.
    pub fn rank(
        &self,
        fused: Vec<FusionRecord>,
        intent: &IntentResult,
        top_k: usize,
    ) -> Vec<RankedCandidate> {
        let window = top_k.saturating_mul(self.multiplier);
        let mut ranked: Vec<RankedCandidate> = fused
            .into_iter()
            .take(window)
            .map(|record| {
                let final_score = record.fused_score + Self::adjustment(&record.candidate, intent);
                RankedCandidate {
                    candidate: record.candidate,
                    fused_score: record.fused_score,
                    final_score: if final_score.is_finite() { final_score } else { 0.0 },
                    strategy_scores: record.strategy_scores,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            OrderedFloat(b.final_score)
                .cmp(&OrderedFloat(a.final_score))
                .then_with(|| a.candidate.id.cmp(&b.candidate.id))
        });
        ranked.truncate(top_k);
        debug!(window, kept = ranked.len(), "Fine ranked candidates");
        ranked
    }
}

/// +0.1 when an intent marker appears, +0.05 per ":" or "：", at most +0.2.
fn density_bonus(content: &str, intent: &IntentResult) -> f32 {
    if !has_density_marker(content, intent) {
        return 0.0;
    }
    let separators = content.chars().filter(|c| matches!(c, ':' | '：')).count();
    (0.1 + 0.05 * separators as f32).min(0.2)
}
