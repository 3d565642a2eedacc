use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::restructure::{restructure, synonym_swap};
use super::templates::{clarify, expand, multi_perspective, paraphrase, simplify, Draft};
use crate::analysis::lexicon::contains_term;
use crate::analysis::{tokenize, QueryAnalyzer};
use crate::types::{
    Complexity, QueryIssue, QueryProfile, QueryType, RewriteCandidate, RewriteOutcome,
    RewriteStrategy,
};

/// Query rewriter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriterConfig {
    /// Maximum rewrites returned.
    pub max_rewrites: usize,
    /// Break score ties in favour of shorter rewrites.
    pub prefer_short: bool,
    /// Extra stop words ignored when extracting key terms.
    pub custom_stopwords: Vec<String>,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            max_rewrites: 10,
            prefer_short: false,
            custom_stopwords: Vec::new(),
        }
    }
}

/// Pick a rewrite strategy from a query profile.
pub fn select_strategy(profile: &QueryProfile) -> RewriteStrategy {
    if profile.has_issue(QueryIssue::Ambiguous) {
        return RewriteStrategy::Clarify;
    }
    if profile.has_issue(QueryIssue::Vague) {
        return RewriteStrategy::MultiPerspective;
    }
    match (profile.complexity, profile.query_type) {
        (
            Complexity::High,
            QueryType::Comparison | QueryType::Explanation | QueryType::General,
        ) => RewriteStrategy::Simplify,
        (Complexity::Low, QueryType::Definition) => RewriteStrategy::Expand,
        _ => RewriteStrategy::Paraphrase,
    }
}

/// Produces alternative phrasings of a query.
#[derive(Debug, Clone)]
pub struct QueryRewriter {
    analyzer: QueryAnalyzer,
    config: RewriterConfig,
}

impl Default for QueryRewriter {
    fn default() -> Self {
        Self::new(RewriterConfig::default())
    }
}

impl QueryRewriter {
    pub fn new(config: RewriterConfig) -> Self {
        let analyzer = QueryAnalyzer::new().with_stopwords(config.custom_stopwords.clone());
        Self { analyzer, config }
    }

    pub fn analyzer(&self) -> &QueryAnalyzer {
        &self.analyzer
    }

    /// Rewrite `query` with `strategy`, or an auto-selected one when `None`.
    pub fn rewrite(&self, query: &str, strategy: Option<RewriteStrategy>) -> RewriteOutcome {
        let profile = self.analyzer.analyze(query);
        self.rewrite_profile(profile, strategy)
    }

    /// Rewrite an already analyzed query.
    pub fn rewrite_profile(
        &self,
        profile: QueryProfile,
        strategy: Option<RewriteStrategy>,
    ) -> RewriteOutcome {
        if profile.is_terminal() {
            return RewriteOutcome {
                original_query: profile.text.clone(),
                profile,
                strategy: None,
                rewrites: Vec::new(),
            };
        }

        let strategy = strategy.unwrap_or_else(|| select_strategy(&profile));
        let mut drafts = generate(&profile, strategy);
        if drafts.is_empty() {
            drafts = paraphrase(&profile);
        }

        let mut rewrites = self.score_and_dedup(drafts, &profile);
        rewrites.truncate(self.config.max_rewrites);
        debug!(
            strategy = %strategy,
            rewrites = rewrites.len(),
            "Rewrote query"
        );

        RewriteOutcome {
            original_query: profile.text.clone(),
            profile,
            strategy: Some(strategy),
            rewrites,
        }
    }

    fn score_and_dedup(&self, drafts: Vec<Draft>, profile: &QueryProfile) -> Vec<RewriteCandidate> {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(normalize(&profile.text));

        let mut scored: Vec<RewriteCandidate> = drafts
            .into_iter()
            .filter_map(|draft| {
                let query = draft.query.trim().to_string();
                if query.is_empty() || !seen.insert(normalize(&query)) {
                    return None;
                }
                Some(RewriteCandidate {
                    score: score(&query, profile),
                    query,
                    strategy: draft.strategy,
                    note: Some(draft.note.to_string()),
                })
            })
            .collect();

        let prefer_short = self.config.prefer_short;
        scored.sort_by(|a, b| {
            OrderedFloat(b.score).cmp(&OrderedFloat(a.score)).then_with(|| {
                if prefer_short {
                    a.query.chars().count().cmp(&b.query.chars().count())
                } else {
                    std::cmp::Ordering::Equal
                }
            })
        });
        scored
    }
}

fn generate(profile: &QueryProfile, strategy: RewriteStrategy) -> Vec<Draft> {
    match strategy {
        RewriteStrategy::Expand => expand(profile),
        RewriteStrategy::Simplify => simplify(profile),
        RewriteStrategy::Paraphrase => paraphrase(profile),
        RewriteStrategy::Clarify => clarify(profile),
        RewriteStrategy::MultiPerspective => multi_perspective(profile),
        RewriteStrategy::Restructure => restructure(profile),
        RewriteStrategy::SynonymSwap => synonym_swap(profile),
        RewriteStrategy::Comprehensive => [
            expand(profile),
            simplify(profile),
            paraphrase(profile),
            clarify(profile),
            multi_perspective(profile),
            restructure(profile),
            synonym_swap(profile),
        ]
        .concat(),
    }
}

fn normalize(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// +1 per retained key term, -0.5 past twenty words, +0.2 for comparison
/// rewrites that say "区别". Rounded to three decimals.
/// Markers that keep a comparison rewrite a comparison.
const COMPARISON_MARKERS: &[&str] = &[
    "区别", "不同", "差异", "对比", "比较", "difference", "compare", "vs", "versus",
];

/// Rewrites longer than this many tokens are penalized.
const LONG_REWRITE_TOKENS: usize = 20;

fn score(query: &str, profile: &QueryProfile) -> f32 {
    let lower = query.to_lowercase();
    let mut score: f32 = profile
        .key_terms
        .iter()
        .filter(|term| lower.contains(&term.to_lowercase()))
        .count() as f32;
    if tokenize(query).len() > LONG_REWRITE_TOKENS {
        score -= 0.5;
    }
    if profile.query_type == QueryType::Comparison
        && COMPARISON_MARKERS.iter().any(|m| contains_term(query, m))
    {
        score += 0.2;
    }
    (score * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_rewrites() {
        let outcome = QueryRewriter::default().rewrite("  ", None);
        assert!(outcome.rewrites.is_empty());
        assert!(outcome.strategy.is_none());
        assert_eq!(outcome.best_query(), "");
    }

    #[test]
    fn test_auto_selects_expand_for_short_definition() {
        let outcome = QueryRewriter::default().rewrite("sensible的定义", None);
        assert_eq!(outcome.strategy, Some(RewriteStrategy::Expand));
        assert!(!outcome.rewrites.is_empty());
        assert!(outcome.rewrites.iter().all(|r| r.query.contains("sensible")));
    }

    #[test]
    fn test_auto_selects_multi_perspective_for_vague() {
        let profile = QueryAnalyzer::new().analyze("什么是 sensible");
        assert_eq!(select_strategy(&profile), RewriteStrategy::MultiPerspective);
    }

    #[test]
    fn test_auto_selects_clarify_for_ambiguous() {
        let rewriter = QueryRewriter::default();
        let profile = rewriter.analyzer().analyze("苹果和香蕉和橘子");
        assert_eq!(select_strategy(&profile), RewriteStrategy::Clarify);
    }

    #[test]
    fn test_rewrites_sorted_and_deduplicated() {
        let outcome =
            QueryRewriter::default().rewrite("sensible的同义词有哪些", Some(RewriteStrategy::Comprehensive));
        let scores: Vec<f32> = outcome.rewrites.iter().map(|r| r.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        let mut seen = HashSet::new();
        assert!(outcome.rewrites.iter().all(|r| seen.insert(normalize(&r.query))));
        assert!(outcome.rewrites.len() <= 10);
    }

    #[test]
    fn test_max_rewrites_and_prefer_short() {
        let rewriter = QueryRewriter::new(RewriterConfig {
            max_rewrites: 3,
            prefer_short: true,
            ..RewriterConfig::default()
        });
        let outcome = rewriter.rewrite("ephemeral", Some(RewriteStrategy::Paraphrase));
        assert_eq!(outcome.rewrites.len(), 3);
        let lengths: Vec<usize> = outcome.rewrites.iter().map(|r| r.query.chars().count()).collect();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_score_rules() {
        let profile = QueryAnalyzer::new().analyze("affect和effect的区别");
        assert_eq!(profile.query_type, QueryType::Comparison);
        assert_eq!(score("affect 和 effect 的区别", &profile), 3.2);
        assert_eq!(score("affect", &profile), 1.0);
        let long = vec!["w"; 21].join(" ");
        assert_eq!(score(&long, &profile), -0.5);
    }

    #[test]
    fn test_english_comparison_marker_scores() {
        let profile = QueryAnalyzer::new().analyze("difference between big and large");
        assert_eq!(profile.query_type, QueryType::Comparison);
        let marked = score("big vs large", &profile);
        let plain = score("big large", &profile);
        assert!((marked - plain - 0.2).abs() < 1e-6);
        assert!(score("big versus large", &profile) > plain);
    }

    #[test]
    fn test_long_cjk_rewrite_is_penalized() {
        let profile = QueryAnalyzer::new().analyze("affect和effect的区别");
        let long = "快乐的".repeat(11);
        assert_eq!(tokenize(&long).len(), 22);
        assert_eq!(score(&long, &profile), -0.5);
    }

    #[test]
    fn test_requested_strategy_without_output_falls_back() {
        let outcome = QueryRewriter::default().rewrite("ephemeral", Some(RewriteStrategy::SynonymSwap));
        assert_eq!(outcome.strategy, Some(RewriteStrategy::SynonymSwap));
        assert!(!outcome.rewrites.is_empty());
        assert!(outcome
            .rewrites
            .iter()
            .all(|r| r.strategy == RewriteStrategy::Paraphrase));
    }
}
