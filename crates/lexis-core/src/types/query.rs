//! Query analysis profile.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString, IntoStaticStr};

/// Dominant script of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Contains CJK ideographs.
    Zh,
    /// Latin script only.
    En,
}

/// Coarse structural complexity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Problems detected in a query.
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
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueryIssue {
    /// No usable content. Terminal for retrieval.
    TooShort,
    /// Short and mostly interrogative words.
    Vague,
    /// Too many conjunctions or possessives.
    Ambiguous,
    /// More than twelve tokens.
    Complex,
    /// Uses grammar terminology.
    Professional,
}

/// Coarse query type, used to pick rewrite strategies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Definition,
    Synonym,
    Example,
    Comparison,
    Usage,
    Explanation,
    #[default]
    General,
}

/// Derived facts about a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryProfile {
    /// The query as given, trimmed.
    pub text: String,
    pub language: Language,
    pub tokens: Vec<String>,
    /// Tokens minus stop words and single characters, order-preserving.
    pub key_terms: Vec<String>,
    pub query_type: QueryType,
    pub complexity: Complexity,
    pub issues: BTreeSet<QueryIssue>,
}

impl QueryProfile {
    pub fn has_issue(&self, issue: QueryIssue) -> bool {
        self.issues.contains(&issue)
    }

    /// Whether the query carries nothing to retrieve with.
    pub fn is_terminal(&self) -> bool {
        self.has_issue(QueryIssue::TooShort)
    }

    pub fn is_chinese(&self) -> bool {
        self.language == Language::Zh
    }
}
