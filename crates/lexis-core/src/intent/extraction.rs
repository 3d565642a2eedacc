//! Target-term extraction.
//!
//! The cascade tries, in order: quoted spans, English tokens, CJK phrases,
//! and finally a core-concept fallback on the query with leading
//! interrogatives stripped. Every candidate must pass [`is_valid_target`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::taxonomy::TAXONOMY;
use crate::analysis::lexicon::{contains_term, has_cjk, is_segment_word, EN_STOPWORDS};
use crate::analysis::{tokenize, TokenKind};

/// Substrings that disqualify a CJK candidate.
const CJK_TARGET_STOPWORDS: &[&str] = &[
    "什么", "哪些", "怎么", "如何", "为什么", "为何", "哪个", "哪", "什么是", "有没有", "有什么",
    "是否", "可以", "能否", "这个", "那个", "这些", "那些", "啥", "关于", "没有",
];

/// Words that disqualify a Latin candidate.
const LATIN_TARGET_STOPWORDS: &[&str] = &["what", "which", "how", "why", "when", "where", "who"];

/// English function words, which never score the content-word bonus.
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "as", "is", "are", "was", "were", "this", "that", "these", "those", "have", "has", "had",
    "do", "does", "did", "be", "can", "could", "will", "would", "should", "mean", "means",
    "meaning", "word", "words",
];

/// Function words, stop words and single-word English intent cues. These
/// score no content bonus and lose a point.
static FILLER_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let cues = TAXONOMY
        .iter()
        .flat_map(|profile| profile.keywords.iter().copied())
        .filter(|k| k.chars().all(|c| c.is_ascii_alphabetic()));
    FUNCTION_WORDS
        .iter()
        .chain(EN_STOPWORDS.iter())
        .copied()
        .chain(cues)
        .collect()
});

/// Words that make a CJK candidate look like a request rather than a term.
const META_WORDS: &[&str] = &["意思", "解释", "查询", "搜索", "查找", "帮助"];

/// Cue words that, directly after a candidate, mark it as the subject.
const SUFFIX_CUES: &[&str] = &[
    "同义词", "近义词", "反义词", "定义", "意思", "例句", "用法", "发音", "词源", "搭配",
    "短语", "这个词", "怎么用",
];

/// Request verbs that, directly before a candidate, mark it as the subject.
const PREFIX_CUES: &[&str] = &["查询", "搜索", "查找"];

/// Leading interrogatives removed by the core-concept fallback.
const LEADING_INTERROGATIVES: &[&str] = &[
    "什么是", "哪些是", "怎么", "如何", "为什么", "为何", "what are", "what is", "how to", "why",
    "which",
];

static QUOTED_SPANS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"[「『"“](.+?)[」』"”]"#,
        r"'(.+?)'",
        r"‘(.+?)’",
        r"【(.+?)】",
        r"《(.+?)》",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static ENGLISH_TOKEN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z-]*[A-Za-z]").ok());

static CJK_CUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"([^的，,；;。.?？!！\s]{1,6}?)的?(?:同义词|近义词|相似词|反义词|定义|意思|含义|解释|例句|例子|用法|发音|读音|词源|词根|词缀|搭配|短语)",
        r"(?:查询|查找|搜索|找|什么是|什么叫|解释|定义)([^的，,；;。.?？!！\s]{1,6})",
        r"([^和与跟及，,；;。.?？!！\s]{1,6}?)(?:和|与|跟|及)([^的，,；;。.?？!！\s]{1,6}?)的?(?:区别|差异|不同)",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static CJK_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^(?:有没有|有什么|是什么|什么是|请问|告诉我|帮我|给出|列出|查询|查找|搜索|什么|哪些|哪个|是否|能否|可以|关于|没有|请|哪|有)[，,。；;：:\s]*",
    )
    .ok()
});

static TRAILING_DEMONSTRATIVE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?:这个|那个)(?:单词|词语|词)?$").ok());

static TRAILING_PUNCTUATION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"[？?。.！!，,；;\s]+$").ok());

static INTERROGATIVE_START: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?:什么|有没有|有什么|是否|能否|可以)").ok());

static LATIN_WORD: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[A-Za-z]{3,}").ok());

/// Whether `candidate` could be the term a query is about.
pub fn is_valid_target(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return false;
    }

    let char_count = candidate.chars().count();
    if char_count == 1 && !candidate.chars().all(char::is_uppercase) {
        return false;
    }

    if CJK_TARGET_STOPWORDS.iter().any(|s| candidate.contains(s))
        || LATIN_TARGET_STOPWORDS
            .iter()
            .any(|s| contains_term(candidate, s))
    {
        return false;
    }

    if candidate.split_whitespace().count() > 3 || is_segment_word(candidate) {
        return false;
    }

    if char_count == 1 {
        return true;
    }

    if has_cjk(candidate) {
        return char_count >= 2;
    }
    candidate.chars().filter(char::is_ascii_alphabetic).count() >= 2
}

/// Strip leading interrogatives or request verbs, a trailing "这个词", and
/// trailing punctuation.
pub fn clean_cjk_candidate(word: &str) -> String {
    let mut current = word.trim().to_string();
    if let Some(prefix) = CJK_PREFIX.as_ref() {
        loop {
            let stripped = prefix.replace(&current, "").to_string();
            if stripped == current {
                break;
            }
            current = stripped;
        }
    }
    if let Some(trailing) = TRAILING_PUNCTUATION.as_ref() {
        current = trailing.replace(&current, "").to_string();
    }
    if let Some(demonstrative) = TRAILING_DEMONSTRATIVE.as_ref() {
        current = demonstrative.replace(&current, "").to_string();
    }
    current.trim().to_string()
}

/// Extract the term a query is about. Returns an empty string when nothing
/// plausible is found.
pub fn extract_target_term(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return String::new();
    }

    quoted_target(query)
        .or_else(|| english_target(query))
        .or_else(|| cjk_target(query))
        .or_else(|| core_concept(query))
        .unwrap_or_default()
}

fn quoted_target(query: &str) -> Option<String> {
    QUOTED_SPANS.iter().find_map(|pattern| {
        pattern
            .captures_iter(query)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .find(|candidate| is_valid_target(candidate))
    })
}

fn char_position(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte| haystack[..byte].chars().count())
}

fn position_bonus(query: &str, candidate: &str) -> f32 {
    let len = query.chars().count();
    match char_position(&query.to_lowercase(), &candidate.to_lowercase()) {
        Some(pos) if len > 0 => (1.0 - pos as f32 / len as f32).max(0.0) * 3.0,
        _ => 0.0,
    }
}

fn score_english(word: &str, query: &str) -> f32 {
    let mut score = 0.0;
    let alpha = word.chars().filter(char::is_ascii_alphabetic).count();
    if (3..=30).contains(&alpha) {
        score += 2.0;
    }
    score += position_bonus(query, word);

    let mut chars = word.chars();
    let capitalized = chars.next().is_some_and(char::is_uppercase);
    if capitalized && !word.chars().all(|c| !c.is_alphabetic() || c.is_uppercase()) {
        score += 1.0;
    }

    let lower = word.to_lowercase();
    if FILLER_WORDS.contains(lower.as_str()) {
        score -= 1.0;
    } else {
        score += 3.0;
    }

    let escaped = regex::escape(word);
    let in_context = [
        format!(r"(?i)\bof\s+{escaped}"),
        format!(r"(?i)'{escaped}'"),
        format!(r#"(?i)"{escaped}""#),
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .any(|re| re.is_match(query));
    if in_context {
        score += 2.0;
    }

    score
}

fn english_target(query: &str) -> Option<String> {
    let pattern = ENGLISH_TOKEN.as_ref()?;
    let mut best: Option<(String, f32)> = None;
    for m in pattern.find_iter(query) {
        let word = m.as_str();
        if !is_valid_target(word) {
            continue;
        }
        let score = score_english(word, query);
        if best.as_ref().map_or(true, |(_, s)| score > *s) {
            best = Some((word.to_string(), score));
        }
    }
    best.filter(|(_, score)| *score >= 0.0).map(|(word, _)| word)
}

fn score_cjk(word: &str, query: &str) -> f32 {
    let mut score = 0.0;
    match word.chars().count() {
        2..=4 => score += 2.0,
        1 => score -= 1.0,
        _ => {}
    }
    score += position_bonus(query, word);

    let suffixed = SUFFIX_CUES
        .iter()
        .any(|cue| query.contains(&format!("{word}的{cue}")) || query.contains(&format!("{word}{cue}")));
    let prefixed = PREFIX_CUES
        .iter()
        .any(|cue| query.contains(&format!("{cue}{word}")));
    if suffixed || prefixed {
        score += 3.0;
    }

    if META_WORDS.iter().any(|m| word.contains(m)) {
        score -= 2.0;
    }
    score
}

fn cjk_candidates(query: &str) -> Vec<String> {
    let mut raw: Vec<String> = Vec::new();
    for pattern in CJK_CUE_PATTERNS.iter() {
        for caps in pattern.captures_iter(query) {
            raw.extend(caps.iter().skip(1).flatten().map(|m| m.as_str().to_string()));
        }
    }
    raw.extend(
        tokenize(query)
            .into_iter()
            .filter(|t| t.kind == TokenKind::Cjk && (2..=6).contains(&t.char_len()))
            .map(|t| t.text),
    );

    let mut cleaned: Vec<String> = Vec::new();
    for candidate in raw {
        let candidate = clean_cjk_candidate(&candidate);
        let rejected = !is_valid_target(&candidate)
            || !has_cjk(&candidate)
            || INTERROGATIVE_START
                .as_ref()
                .is_some_and(|re| re.is_match(&candidate));
        if !rejected && !cleaned.contains(&candidate) {
            cleaned.push(candidate);
        }
    }
    cleaned
}

/// Highest-scoring valid CJK candidate, or the first one when every score
/// is poor.
fn cjk_target(query: &str) -> Option<String> {
    let candidates = cjk_candidates(query);
    let mut best: Option<(&String, f32)> = None;
    for candidate in &candidates {
        let score = score_cjk(candidate, query);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((word, score)) if score > -1.0 => Some(word.clone()),
        _ => candidates.first().cloned(),
    }
}

fn strip_leading_interrogatives(query: &str) -> String {
    let mut current = query.trim().to_string();
    loop {
        let lower = current.to_lowercase();
        let Some(prefix) = LEADING_INTERROGATIVES
            .iter()
            .find(|p| lower.starts_with(*p))
        else {
            break;
        };
        // Prefixes are ASCII or CJK, so byte offsets agree after lowercasing.
        current = current[prefix.len()..].trim_start().to_string();
    }
    current
}

fn core_concept(query: &str) -> Option<String> {
    let reduced = strip_leading_interrogatives(query);
    if reduced.is_empty() {
        return None;
    }

    english_target(&reduced)
        .or_else(|| cjk_target(&reduced))
        .or_else(|| {
            // Whole segments only, so a span never starts or ends mid-word.
            tokenize(&reduced)
                .into_iter()
                .filter(|t| t.kind == TokenKind::Cjk)
                .map(|t| clean_cjk_candidate(&t.text))
                .find(|c| is_valid_target(c))
        })
        .or_else(|| {
            LATIN_WORD.as_ref().and_then(|re| {
                re.find_iter(&reduced)
                    .map(|m| m.as_str().to_string())
                    .find(|c| is_valid_target(c))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rules() {
        assert!(!is_valid_target(""));
        assert!(!is_valid_target("a"));
        assert!(is_valid_target("I"));
        assert!(!is_valid_target("什么"));
        assert!(!is_valid_target("what"));
        assert!(!is_valid_target("one two three four"));
        assert!(!is_valid_target("快"));
        assert!(!is_valid_target("同义词"));
        assert!(is_valid_target("快乐"));
        assert!(is_valid_target("however"));
        assert!(is_valid_target("well-known"));
        assert!(!is_valid_target("42"));
    }

    #[test]
    fn test_clean_cjk_candidate() {
        assert_eq!(clean_cjk_candidate("请给出快乐"), "快乐");
        assert_eq!(clean_cjk_candidate("有哪些？"), "");
        assert_eq!(clean_cjk_candidate("什么是，幸福。"), "幸福");
    }

    #[test]
    fn test_quoted_span_wins() {
        assert_eq!(
            extract_target_term("What is the meaning of \"ephemeral\"?"),
            "ephemeral"
        );
        assert_eq!(extract_target_term("《围城》的作者"), "围城");
        assert_eq!(extract_target_term("「快乐」的近义词"), "快乐");
    }

    #[test]
    fn test_english_token_in_mixed_query() {
        assert_eq!(extract_target_term("sensible的同义词有哪些"), "sensible");
        assert_eq!(extract_target_term("什么是 sensible"), "sensible");
        assert_eq!(extract_target_term("what does ephemeral mean"), "ephemeral");
    }

    #[test]
    fn test_cjk_phrase_scoring() {
        assert_eq!(extract_target_term("快乐的同义词是什么"), "快乐");
        assert_eq!(extract_target_term("查询幸福"), "幸福");
        assert_eq!(extract_target_term("请给出快乐的同义词"), "快乐");
    }

    #[test]
    fn test_invalid_phrase_does_not_shadow_term() {
        assert_eq!(extract_target_term("幸福是什么意思"), "幸福");
        assert_eq!(extract_target_term("快乐是什么意思？"), "快乐");
        assert_eq!(extract_target_term("幸福有什么意思"), "幸福");
    }

    #[test]
    fn test_demonstratives_and_topic_markers() {
        assert_eq!(extract_target_term("高兴这个词怎么用"), "高兴");
        assert_eq!(extract_target_term("有没有关于勇敢的短语"), "勇敢");
        assert_eq!(clean_cjk_candidate("没有关于勇敢"), "勇敢");
        assert_eq!(clean_cjk_candidate("高兴这个词"), "高兴");
        assert!(!is_valid_target("关于勇敢"));
    }

    #[test]
    fn test_request_words_lose_to_content_words() {
        assert_eq!(
            extract_target_term("give an example sentence for ephemeral"),
            "ephemeral"
        );
        assert_eq!(extract_target_term("synonyms of similar"), "similar");
        assert_eq!(extract_target_term("please show the pronunciation of Quay"), "Quay");
    }

    #[test]
    fn test_nothing_to_extract() {
        assert_eq!(extract_target_term(""), "");
        assert_eq!(extract_target_term("什么是"), "");
        assert_eq!(extract_target_term("?？"), "");
    }
}
