use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use super::lexicon::{
    contains_term, count_term, has_cjk, EN_STOPWORDS, INTERROGATIVES, PROFESSIONAL_TERMS,
    ZH_STOPWORDS,
};
use super::tokenizer::tokenize;
use crate::types::{Complexity, Language, QueryIssue, QueryProfile, QueryType};

const ZH_TYPE_CUES: &[(QueryType, &[&str])] = &[
    (QueryType::Definition, &["是什么", "什么是", "定义", "意思", "含义"]),
    (QueryType::Synonym, &["近义词", "同义词", "相似词"]),
    (QueryType::Example, &["例子", "示例", "举例", "例句"]),
    (QueryType::Comparison, &["区别", "不同", "差异", "对比"]),
    (QueryType::Usage, &["用法", "如何使用", "怎么用"]),
    (QueryType::Explanation, &["解释", "说明", "讲解"]),
];

const EN_TYPE_CUES: &[(QueryType, &[&str])] = &[
    (QueryType::Definition, &["what is", "definition of", "meaning of", "define"]),
    (QueryType::Synonym, &["synonym", "synonyms", "similar to", "similar words"]),
    (QueryType::Example, &["example", "examples", "use case"]),
    (QueryType::Comparison, &["difference", "vs", "versus"]),
    (QueryType::Usage, &["how to use", "usage"]),
    (QueryType::Explanation, &["explain", "explain why", "explain how"]),
];

/// Derives a [`QueryProfile`] from raw query text.
#[derive(Debug, Clone, Default)]
pub struct QueryAnalyzer {
    custom_stopwords: HashSet<String>,
}

impl QueryAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add stop words on top of the built-in lists.
    pub fn with_stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_stopwords
            .extend(stopwords.into_iter().map(|s| s.into().to_lowercase()));
        self
    }

    pub fn analyze(&self, query: &str) -> QueryProfile {
        let text = query.trim().to_string();
        let language = if has_cjk(&text) {
            Language::Zh
        } else {
            Language::En
        };
        let tokens: Vec<String> = tokenize(&text).into_iter().map(|t| t.text).collect();
        let key_terms = self.key_terms(&tokens, language);
        let query_type = classify_query_type(&text, language);
        let complexity = match tokens.len() {
            0..=4 => Complexity::Low,
            5..=8 => Complexity::Medium,
            _ => Complexity::High,
        };
        let issues = detect_issues(&text, &tokens);

        debug!(
            language = %language,
            tokens = tokens.len(),
            query_type = %query_type,
            issues = ?issues,
            "Analyzed query"
        );

        QueryProfile {
            text,
            language,
            tokens,
            key_terms,
            query_type,
            complexity,
            issues,
        }
    }

    fn is_stopword(&self, token: &str, language: Language) -> bool {
        let lower = token.to_lowercase();
        let builtin = match language {
            Language::Zh => {
                ZH_STOPWORDS.contains(&lower.as_str()) || EN_STOPWORDS.contains(&lower.as_str())
            }
            Language::En => EN_STOPWORDS.contains(&lower.as_str()),
        };
        builtin || self.custom_stopwords.contains(&lower)
    }

    /// Non-stop-word tokens longer than one character, Latin lowercased,
    /// deduplicated in order.
    pub fn key_terms(&self, tokens: &[String], language: Language) -> Vec<String> {
        let mut seen = HashSet::new();
        tokens
            .iter()
            .filter(|t| t.chars().count() > 1 && !self.is_stopword(t, language))
            .map(|t| {
                if has_cjk(t) {
                    t.clone()
                } else {
                    t.to_lowercase()
                }
            })
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}

/// Coarse query type from language-specific cue tables, first match wins.
pub fn classify_query_type(text: &str, language: Language) -> QueryType {
    let table = match language {
        Language::Zh => ZH_TYPE_CUES,
        Language::En => EN_TYPE_CUES,
    };
    table
        .iter()
        .find(|(_, cues)| cues.iter().any(|cue| contains_term(text, cue)))
        .map(|(query_type, _)| *query_type)
        .unwrap_or_default()
}

fn detect_issues(text: &str, tokens: &[String]) -> BTreeSet<QueryIssue> {
    let mut issues = BTreeSet::new();

    if text.chars().filter(|c| !c.is_whitespace()).count() < 2 || tokens.is_empty() {
        issues.insert(QueryIssue::TooShort);
    }

    let interrogatives = tokens
        .iter()
        .filter(|t| INTERROGATIVES.contains(&t.to_lowercase().as_str()))
        .count();
    if tokens.len() <= 4 && interrogatives > 0 && interrogatives * 2 >= tokens.len() {
        issues.insert(QueryIssue::Vague);
    }

    let ands = tokens.iter().filter(|t| t.eq_ignore_ascii_case("and")).count();
    if count_term(text, "的") > 2 || ands > 2 || count_term(text, "和") > 1 {
        issues.insert(QueryIssue::Ambiguous);
    }

    if tokens.len() > 12 {
        issues.insert(QueryIssue::Complex);
    }

    if tokens
        .iter()
        .any(|t| PROFESSIONAL_TERMS.contains(&t.to_lowercase().as_str()))
    {
        issues.insert(QueryIssue::Professional);
    }

    issues
}
