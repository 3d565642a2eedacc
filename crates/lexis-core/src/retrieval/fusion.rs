//! Intent-weighted reciprocal rank fusion.
//!
//! Each strategy contributes `weight / (rank + k)` for every candidate it
//! returned, with `rank` 0-based. Candidates are merged by id into a flat
//! arena; the first payload seen for an id is kept.

use std::collections::{BTreeMap, HashMap, HashSet};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FusionRecord, Intent, StrategyKind, StrategyResult};

/// Intent multiplier on a strategy's base weight.
pub fn intent_multiplier(kind: StrategyKind, intent: Intent) -> f32 {
    match (intent, kind) {
        (Intent::Synonym, StrategyKind::ExactMatch | StrategyKind::IntentionAware) => 1.5,
        (Intent::Synonym, StrategyKind::Semantic) => 0.8,
        _ => 1.0,
    }
}

/// Base weight scaled by the intent multiplier.
pub fn effective_weight(kind: StrategyKind, base_weight: f32, intent: Intent) -> f32 {
    base_weight * intent_multiplier(kind, intent)
}

/// Weighted RRF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedRrf {
    /// Smoothing constant. Default: 60.
    pub k: f32,
}

impl Default for WeightedRrf {
    fn default() -> Self {
        Self { k: 60.0 }
    }
}

impl WeightedRrf {
    pub fn new(k: f32) -> Self {
        Self { k }
    }

    /// Fuse per-strategy results into one list, best first. Ties are broken
    /// by candidate id.
    ///
    /// `base_weight` gives the configured weight of each strategy; each
    /// result's own `weight_scale` and the intent multiplier are applied on
    /// top.
    pub fn fuse<W>(&self, results: &[StrategyResult], base_weight: W, intent: Intent) -> Vec<FusionRecord>
    where
        W: Fn(StrategyKind) -> f32,
    {
        let mut arena: Vec<FusionRecord> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();

        for result in results {
            if result.candidates.is_empty() {
                continue;
            }
            let weight =
                effective_weight(result.strategy, base_weight(result.strategy), intent) * result.weight_scale;
            let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };

            let mut seen_in_list: HashSet<&str> = HashSet::new();
            for (rank, candidate) in result.candidates.iter().enumerate() {
                if !seen_in_list.insert(candidate.id.as_str()) {
                    continue;
                }
                let contribution = weight / (rank as f32 + self.k);
                let slot = *slots.entry(candidate.id.as_str()).or_insert_with(|| {
                    arena.push(FusionRecord {
                        candidate: candidate.clone(),
                        fused_score: 0.0,
                        strategy_scores: BTreeMap::new(),
                    });
                    arena.len() - 1
                });
                let record = &mut arena[slot];
                record.fused_score += contribution;
                *record.strategy_scores.entry(result.strategy).or_insert(0.0) += contribution;
            }
        }

        arena.sort_by(|a, b| {
            OrderedFloat(b.fused_score)
                .cmp(&OrderedFloat(a.fused_score))
                .then_with(|| a.candidate.id.cmp(&b.candidate.id))
        });
        debug!(lists = results.len(), fused = arena.len(), "Fused strategy results");
        arena
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candidate;

    fn result(kind: StrategyKind, ids: &[&str]) -> StrategyResult {
        let candidates = ids
            .iter()
            .map(|id| Candidate {
                id: id.to_string(),
                content: format!("{kind} {id}"),
                word: "w".to_string(),
                chunk_type: "definition".to_string(),
                strategy: kind,
                score: 0.5,
            })
            .collect();
        StrategyResult::completed(kind, candidates)
    }

    fn score_of(records: &[FusionRecord], id: &str) -> f32 {
        records
            .iter()
            .find(|r| r.candidate.id == id)
            .map(|r| r.fused_score)
            .unwrap_or(0.0)
    }

    #[test]
    fn test_partial_overlap_accumulates() {
        let results = vec![
            result(StrategyKind::Semantic, &["a", "b", "c"]),
            result(StrategyKind::Lexical, &["b", "d"]),
        ];
        let fused = WeightedRrf::default().fuse(&results, |_| 0.5, Intent::General);

        let (a, b, d) = (score_of(&fused, "a"), score_of(&fused, "b"), score_of(&fused, "d"));
        assert!((a - 0.5 / 60.0).abs() < 1e-7);
        assert!((b - (0.5 / 61.0 + 0.5 / 60.0)).abs() < 1e-7);
        assert!((d - 0.5 / 61.0).abs() < 1e-7);
        assert!(b > a && b > d);
        assert_eq!(fused[0].candidate.id, "b");
        assert_eq!(fused.len(), 4);
    }

    #[test]
    fn test_ids_are_unique_and_first_payload_kept() {
        let results = vec![
            result(StrategyKind::Semantic, &["a", "a", "b"]),
            result(StrategyKind::Lexical, &["a"]),
        ];
        let fused = WeightedRrf::default().fuse(&results, |_| 1.0, Intent::General);
        assert_eq!(fused.len(), 2);
        let a = &fused[0];
        assert_eq!(a.candidate.id, "a");
        assert_eq!(a.candidate.strategy, StrategyKind::Semantic);
        assert!((a.strategy_scores[&StrategyKind::Semantic] - 1.0 / 60.0).abs() < 1e-7);
        assert_eq!(a.strategy_scores.len(), 2);
    }

    #[test]
    fn test_ties_break_by_id() {
        let results = vec![
            result(StrategyKind::Semantic, &["z"]),
            result(StrategyKind::Lexical, &["m"]),
        ];
        let fused = WeightedRrf::default().fuse(&results, |_| 0.5, Intent::General);
        let ids: Vec<&str> = fused.iter().map(|r| r.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["m", "z"]);
    }

    #[test]
    fn test_synonym_multipliers() {
        let base = 0.1;
        assert!(effective_weight(StrategyKind::IntentionAware, base, Intent::Synonym) > base);
        assert!(effective_weight(StrategyKind::ExactMatch, base, Intent::Synonym) > base);
        assert!(effective_weight(StrategyKind::Semantic, base, Intent::Synonym) < base);
        assert_eq!(effective_weight(StrategyKind::Lexical, base, Intent::Synonym), base);
        assert_eq!(effective_weight(StrategyKind::Semantic, base, Intent::Definition), base);
    }

    #[test]
    fn test_weight_increase_is_monotonic() {
        let results = vec![
            result(StrategyKind::Semantic, &["a", "b"]),
            result(StrategyKind::Lexical, &["c"]),
        ];
        let low = WeightedRrf::default().fuse(&results, |k| if k == StrategyKind::Semantic { 0.2 } else { 0.3 }, Intent::General);
        let high = WeightedRrf::default().fuse(&results, |k| if k == StrategyKind::Semantic { 0.6 } else { 0.3 }, Intent::General);
        for id in ["a", "b"] {
            assert!(score_of(&high, id) >= score_of(&low, id));
        }
        assert_eq!(score_of(&high, "c"), score_of(&low, "c"));
    }

    #[test]
    fn test_variant_weight_scale() {
        let variant = result(StrategyKind::Semantic, &["a"]).for_variant("q2", 0.5);
        let fused = WeightedRrf::default().fuse(&[variant], |_| 1.0, Intent::General);
        assert!((fused[0].fused_score - 0.5 / 60.0).abs() < 1e-7);
    }
}
