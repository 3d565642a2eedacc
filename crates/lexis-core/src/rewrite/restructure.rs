//! Sentence-pattern swaps and dictionary synonym substitution.

use once_cell::sync::Lazy;
use regex::Regex;

use super::templates::Draft;
use crate::analysis::tokenize;
use crate::types::{Language, QueryProfile, RewriteStrategy};

/// `(pattern, replacements)`; replacements use `$1`-style group references.
const PATTERN_SWAPS: &[(&str, &[&str])] = &[
    (r"^怎么(.+)$", &["如何$1"]),
    (r"^如何(.+)$", &["怎么$1"]),
    (r"^什么是\s*(.+)$", &["${1}的定义"]),
    (r"^(.+?)\s*是什么$", &["什么是$1"]),
    (r"^为什么(.+)$", &["${1}的原因"]),
    (r"^(.+)的近义词$", &["${1}的同义词", "与${1}意思相近的词", "${1}的相似表达"]),
    (r"^(.+)的用法$", &["如何使用$1", "${1}的应用场景", "${1}的正确用法"]),
    (r"^(.+)和(.+)的区别$", &["${1}与${2}的差异", "${1}和${2}的不同点", "比较${1}和${2}"]),
    (r"(?i)^what\s+is\s+(.+)$", &["define $1", "$1 meaning"]),
    (r"(?i)^how\s+to\s+(.+)$", &["ways to $1"]),
];

static COMPILED_SWAPS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    PATTERN_SWAPS
        .iter()
        .filter_map(|(p, r)| Regex::new(p).ok().map(|re| (re, *r)))
        .collect()
});

const SYNONYMS: &[(&str, &[&str])] = &[
    ("怎么", &["如何", "怎样"]),
    ("如何", &["怎么", "怎样"]),
    ("区别", &["不同", "差异", "差别"]),
    ("用法", &["使用方法", "运用"]),
    ("例子", &["示例", "实例"]),
    ("例句", &["示例句子"]),
    ("近义词", &["同义词", "相似词"]),
    ("同义词", &["近义词", "相似词"]),
    ("意思", &["含义", "释义"]),
    ("meaning", &["definition", "sense"]),
    ("example", &["sample sentence", "illustration"]),
    ("difference", &["distinction"]),
];

fn strip_question_marks(text: &str) -> &str {
    text.trim_end_matches(['?', '？', '。', '.', ' '])
}

pub(crate) fn restructure(profile: &QueryProfile) -> Vec<Draft> {
    let s = RewriteStrategy::Restructure;
    let query = strip_question_marks(&profile.text);
    let mut drafts = Vec::new();

    for (regex, replacements) in COMPILED_SWAPS.iter() {
        if regex.is_match(query) {
            for replacement in replacements.iter() {
                let rewritten = regex.replace(query, *replacement).trim().to_string();
                drafts.push(Draft::new(rewritten, s, "sentence pattern swap"));
            }
        }
    }

    if profile.language == Language::Zh && !profile.text.contains('吗') && !profile.text.contains('?') {
        drafts.push(Draft::new(format!("{query}吗？"), s, "yes-no form"));
        drafts.push(Draft::new(format!("请问{query}"), s, "polite form"));
        drafts.push(Draft::new(format!("我想了解{query}"), s, "polite form"));
    }
    drafts
}

pub(crate) fn synonym_swap(profile: &QueryProfile) -> Vec<Draft> {
    let s = RewriteStrategy::SynonymSwap;
    let chars: Vec<char> = profile.text.chars().collect();
    let mut drafts = Vec::new();

    for token in tokenize(&profile.text) {
        let lower = token.text.to_lowercase();
        let Some((_, synonyms)) = SYNONYMS.iter().find(|(word, _)| *word == lower) else {
            continue;
        };
        let before: String = chars[..token.position].iter().collect();
        let after: String = chars[token.position + token.char_len()..].iter().collect();
        for synonym in synonyms.iter() {
            drafts.push(Draft::new(format!("{before}{synonym}{after}"), s, "synonym replacement"));
        }
    }
    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::QueryAnalyzer;

    fn queries(drafts: Vec<Draft>) -> Vec<String> {
        drafts.into_iter().map(|d| d.query).collect()
    }

    #[test]
    fn test_restructure_definition_question() {
        let profile = QueryAnalyzer::new().analyze("什么是 sensible？");
        let rewrites = queries(restructure(&profile));
        assert!(rewrites.contains(&"sensible的定义".to_string()));
        assert!(rewrites.contains(&"请问什么是 sensible".to_string()));
    }

    #[test]
    fn test_restructure_comparison_uses_both_terms() {
        let profile = QueryAnalyzer::new().analyze("affect和effect的区别");
        let rewrites = queries(restructure(&profile));
        assert!(rewrites.contains(&"比较affect和effect".to_string()));
        assert!(rewrites.contains(&"affect与effect的差异".to_string()));
    }

    #[test]
    fn test_english_restructure_has_no_chinese_wrappers() {
        let profile = QueryAnalyzer::new().analyze("what is ephemeral");
        let rewrites = queries(restructure(&profile));
        assert_eq!(rewrites, vec!["define ephemeral", "ephemeral meaning"]);
    }

    #[test]
    fn test_synonym_swap_replaces_tokens_in_place() {
        let profile = QueryAnalyzer::new().analyze("happy的近义词");
        let rewrites = queries(synonym_swap(&profile));
        assert_eq!(rewrites, vec!["happy的同义词", "happy的相似词"]);
    }

    #[test]
    fn test_synonym_swap_ignores_partial_words() {
        let profile = QueryAnalyzer::new().analyze("什么是 sensible");
        assert!(synonym_swap(&profile).is_empty());
    }
}
