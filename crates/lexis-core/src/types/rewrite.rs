//! Query rewriting types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::QueryProfile;

/// Rewrite strategies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
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
pub enum RewriteStrategy {
    /// Add context words around the key terms.
    Expand,
    /// Reduce to the key terms.
    Simplify,
    /// Interrogative and lexical templates.
    Paraphrase,
    /// Disambiguating templates.
    Clarify,
    /// The same question from different angles.
    MultiPerspective,
    /// Sentence-pattern swaps.
    Restructure,
    /// Dictionary synonym substitution.
    SynonymSwap,
    /// All of the above.
    Comprehensive,
}

impl RewriteStrategy {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// One rewritten query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteCandidate {
    pub query: String,
    pub strategy: RewriteStrategy,
    /// Retained key terms, minus length penalties, plus type bonuses.
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Everything a rewrite call produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteOutcome {
    pub original_query: String,
    pub profile: QueryProfile,
    /// The strategy that was requested or auto-selected.
    pub strategy: Option<RewriteStrategy>,
    pub rewrites: Vec<RewriteCandidate>,
}

impl RewriteOutcome {
    /// The best rewrite's text, or the original query.
    pub fn best_query(&self) -> &str {
        self.rewrites
            .first()
            .map(|r| r.query.as_str())
            .unwrap_or(&self.original_query)
    }
}
