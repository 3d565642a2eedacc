use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::extraction::extract_target_term;
use super::rules::pattern_signal;
use super::taxonomy::TAXONOMY;
use crate::analysis::lexicon::{contains_term, EN_STOPWORDS, ZH_STOPWORDS};
use crate::analysis::tokenize;
use crate::types::{DetectionMethod, Intent, IntentResult};

/// Weights and thresholds for intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Keyword confidence above which the keyword signal decides alone.
    pub fast_path_threshold: f32,
    pub keyword_weight: f32,
    pub semantic_weight: f32,
    pub pattern_weight: f32,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            fast_path_threshold: 0.8,
            keyword_weight: 0.4,
            semantic_weight: 0.4,
            pattern_weight: 0.2,
        }
    }
}

impl IntentConfig {
    /// Validate configuration values are in valid ranges.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(0.0..=1.0).contains(&self.fast_path_threshold) {
            return Err("fast_path_threshold must be between 0.0 and 1.0");
        }
        let weights = [self.keyword_weight, self.semantic_weight, self.pattern_weight];
        if weights.iter().any(|w| *w < 0.0) {
            return Err("signal weights must be non-negative");
        }
        if weights.iter().sum::<f32>() <= 0.0 {
            return Err("at least one signal weight must be positive");
        }
        Ok(())
    }

    fn weight(&self, method: DetectionMethod) -> f32 {
        match method {
            DetectionMethod::Keyword => self.keyword_weight,
            DetectionMethod::Semantic => self.semantic_weight,
            DetectionMethod::Pattern => self.pattern_weight,
            DetectionMethod::Combined => 0.0,
        }
    }
}

/// One signal's opinion.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalVote {
    pub intent: Intent,
    pub target: String,
    pub confidence: f32,
    pub method: DetectionMethod,
}

impl SignalVote {
    pub fn new(
        intent: Intent,
        target: impl Into<String>,
        confidence: f32,
        method: DetectionMethod,
    ) -> Self {
        Self {
            intent,
            target: target.into(),
            confidence,
            method,
        }
    }

    fn silent(method: DetectionMethod) -> Self {
        Self::new(Intent::General, "", 0.0, method)
    }
}

/// Classifies a query into an [`Intent`] and extracts its target term.
///
/// Three signals vote: keyword hits, token-level Jaccard similarity against
/// example queries, and the pattern rule table. A decisive keyword signal
/// short-circuits the other two.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    config: IntentConfig,
    example_tokens: Vec<(Intent, Vec<HashSet<String>>)>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(IntentConfig::default())
    }
}

impl IntentClassifier {
    pub fn new(config: IntentConfig) -> Self {
        let example_tokens = TAXONOMY
            .iter()
            .map(|profile| {
                let sets = profile.examples.iter().map(|e| token_set(e)).collect();
                (profile.intent, sets)
            })
            .collect();
        Self {
            config,
            example_tokens,
        }
    }

    pub fn config(&self) -> &IntentConfig {
        &self.config
    }

    pub fn classify(&self, query: &str) -> IntentResult {
        let query = query.trim();
        if query.is_empty() {
            return IntentResult::empty();
        }

        let keyword = self.keyword_signal(query);
        if keyword.confidence > self.config.fast_path_threshold {
            let extracted = extract_target_term(query);
            let target = if extracted.is_empty() {
                keyword.target
            } else {
                extracted
            };
            debug!(intent = %keyword.intent, target = %target, "Keyword fast path");
            return IntentResult::new(
                keyword.intent,
                target,
                keyword.confidence,
                DetectionMethod::Keyword,
            );
        }

        let semantic = self.semantic_signal(query);
        let pattern = pattern_signal(query);
        self.combine(query, [keyword, semantic, pattern])
    }

    /// Keyword hits per intent, normalized by the best count.
    pub fn keyword_signal(&self, query: &str) -> SignalVote {
        let counts: Vec<(Intent, usize)> = TAXONOMY
            .iter()
            .map(|profile| {
                let hits = profile
                    .keywords
                    .iter()
                    .filter(|k| contains_term(query, k))
                    .count();
                (profile.intent, hits)
            })
            .collect();

        let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        if max == 0 {
            return SignalVote::silent(DetectionMethod::Keyword);
        }

        let (intent, best) = counts
            .iter()
            .copied()
            .find(|(_, c)| *c == max)
            .unwrap_or((Intent::General, 0));
        SignalVote::new(
            intent,
            extract_target_term(query),
            best as f32 / max as f32,
            DetectionMethod::Keyword,
        )
    }

    /// Best Jaccard similarity between the query and each intent's examples.
    pub fn semantic_signal(&self, query: &str) -> SignalVote {
        let query_tokens = token_set(query);
        let mut best = (Intent::General, 0.0_f32);
        for (intent, examples) in &self.example_tokens {
            let similarity = examples
                .iter()
                .map(|example| jaccard(&query_tokens, example))
                .fold(0.0_f32, f32::max);
            if similarity > best.1 {
                best = (*intent, similarity);
            }
        }

        if best.1 <= 0.0 {
            return SignalVote::silent(DetectionMethod::Semantic);
        }
        SignalVote::new(
            best.0,
            extract_target_term(query),
            best.1,
            DetectionMethod::Semantic,
        )
    }

    fn combine(&self, query: &str, votes: [SignalVote; 3]) -> IntentResult {
        let mut scores: Vec<(Intent, f32)> = Vec::new();
        for vote in &votes {
            let contribution = vote.confidence * self.config.weight(vote.method);
            if contribution <= 0.0 {
                continue;
            }
            match scores.iter_mut().find(|(intent, _)| *intent == vote.intent) {
                Some((_, score)) => *score += contribution,
                None => scores.push((vote.intent, contribution)),
            }
        }

        let mut best: Option<(Intent, f32)> = None;
        for (intent, score) in &scores {
            if best.map_or(true, |(_, s)| *score > s) {
                best = Some((*intent, *score));
            }
        }
        let (intent, confidence) = best.unwrap_or((Intent::General, 0.0));

        let target = majority_target(&votes).unwrap_or_else(|| extract_target_term(query));
        debug!(
            intent = %intent,
            confidence,
            target = %target,
            "Combined intent signals"
        );

        IntentResult {
            scores: Some(scores.into_iter().collect::<BTreeMap<_, _>>()),
            ..IntentResult::new(intent, target, confidence, DetectionMethod::Combined)
        }
    }
}

fn majority_target(votes: &[SignalVote]) -> Option<String> {
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for vote in votes.iter().filter(|v| !v.target.is_empty()) {
        match tally.iter_mut().find(|(t, _)| *t == vote.target) {
            Some((_, n)) => *n += 1,
            None => tally.push((vote.target.as_str(), 1)),
        }
    }
    let max = tally.iter().map(|(_, n)| *n).max()?;
    tally
        .into_iter()
        .find(|(_, n)| *n == max)
        .map(|(t, _)| t.to_string())
}

/// Nouns that name the headword rather than ask about it.
const HEADWORD_NOUNS: &[&str] = &["word", "words", "term"];

/// Cue tokens of `text`: stop words and the text's own target term are
/// dropped, so two queries about different words can still match.
fn token_set(text: &str) -> HashSet<String> {
    let target = extract_target_term(text).to_lowercase();
    tokenize(text)
        .into_iter()
        .map(|t| t.text.to_lowercase())
        .filter(|t| {
            *t != target
                && !ZH_STOPWORDS.contains(&t.as_str())
                && !EN_STOPWORDS.contains(&t.as_str())
                && !HEADWORD_NOUNS.contains(&t.as_str())
        })
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f32 / union as f32
}
