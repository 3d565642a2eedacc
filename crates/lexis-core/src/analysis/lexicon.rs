//! Word lists shared by the analyzer, the intent classifier and the rewriter.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Chinese stop words.
pub const ZH_STOPWORDS: &[&str] = &[
    "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "什么", "哪些",
    "怎么", "如何", "为什么", "吗", "呢", "吧", "啊", "请", "给出", "列出", "一下", "有哪些", "是什么",
    "什么是", "有什么", "有没有", "怎么样",
];

/// English stop words.
pub const EN_STOPWORDS: &[&str] = &[
    "the", "is", "are", "a", "an", "in", "on", "of", "for", "to", "how", "what", "which",
    "why", "do", "does", "did", "me", "some", "give", "please", "and", "or",
];

/// Interrogative words, used for vagueness detection.
pub const INTERROGATIVES: &[&str] = &[
    "怎么样", "如何", "什么", "哪些", "怎么", "为什么", "什么是", "是什么", "有哪些", "哪个",
    "how", "what", "which", "why", "when", "where", "who",
];

/// Grammar terminology.
pub const PROFESSIONAL_TERMS: &[&str] = &["语法", "时态", "句型", "词性", "syntax", "tense"];

/// Single characters that always end a CJK segment.
const SEGMENT_BREAKS: &[char] = &['的', '了', '吗', '呢', '吧', '啊', '和', '与', '或', '及', '请'];

/// Multi-character words the segmenter keeps whole.
const SEGMENT_WORDS: &[&str] = &[
    // interrogatives and request phrases
    "什么是", "是什么", "什么叫", "有哪些", "有什么", "有没有", "哪些", "哪个", "什么", "怎么样",
    "怎么用", "怎么", "如何", "为什么", "为何", "是否", "能否", "可以", "给出", "列出", "告诉",
    "一下", "请问", "帮我", "意思是", "关于", "没有",
    // demonstratives that point at the term
    "这个词", "那个词", "这个单词", "那个单词", "这个", "那个", "这些", "那些", "单词", "词语",
    "词汇",
    // lexical cue words
    "同义词", "近义词", "相似词", "同近义词", "反义词", "相反词", "定义", "意思", "含义", "释义",
    "解释", "例句", "例子", "示例", "举例", "造句", "用法", "使用", "短语", "搭配", "词组",
    "固定搭配", "习语", "发音", "读音", "音标", "怎么读", "怎么念", "词源", "来源", "起源",
    "词根", "由来", "区别", "不同", "差异", "对比", "比较", "派生词", "词族", "同根词", "词性",
    "正式", "非正式", "口语", "书面语", "俚语", "语体", "查询", "查找", "搜索", "说明", "讲解",
    "注意事项", "语法", "时态", "句型",
];

static SEGMENT_LEXICON: Lazy<HashSet<&'static str>> =
    Lazy::new(|| SEGMENT_WORDS.iter().copied().collect());

/// Longest entry in the segment lexicon, in characters.
pub(crate) const MAX_SEGMENT_CHARS: usize = 6;

pub(crate) fn is_segment_word(word: &str) -> bool {
    SEGMENT_LEXICON.contains(word)
}

pub(crate) fn is_segment_break(c: char) -> bool {
    SEGMENT_BREAKS.contains(&c)
}

/// CJK unified ideograph.
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

pub fn has_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Whether `haystack` contains `term`.
///
/// CJK terms match as substrings. Latin terms must sit on word boundaries, so
/// "vs" does not match inside "obvious". Both sides are compared lowercased.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    let haystack = haystack.to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    if has_cjk(&term) {
        return haystack.contains(&term);
    }
    haystack.match_indices(&term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphanumeric())
            && !after.is_some_and(|c| c.is_ascii_alphanumeric())
    })
}

/// Number of times `term` occurs per [`contains_term`] rules.
pub fn count_term(haystack: &str, term: &str) -> usize {
    let haystack = haystack.to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return 0;
    }
    if has_cjk(&term) {
        return haystack.matches(term.as_str()).count();
    }
    haystack
        .match_indices(&term)
        .filter(|(start, _)| {
            let before = haystack[..*start].chars().next_back();
            let after = haystack[start + term.len()..].chars().next();
            !before.is_some_and(|c| c.is_ascii_alphanumeric())
                && !after.is_some_and(|c| c.is_ascii_alphanumeric())
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_term_latin_boundaries() {
        assert!(contains_term("happy vs glad", "vs"));
        assert!(!contains_term("obvious", "vs"));
        assert!(contains_term("What does it MEAN", "mean"));
        assert!(contains_term("similar words for x", "similar words"));
    }

    #[test]
    fn test_contains_term_cjk_substring() {
        assert!(contains_term("sensible的同义词有哪些", "同义词"));
        assert!(!contains_term("sensible的反义词", "同义词"));
    }

    #[test]
    fn test_count_term() {
        assert_eq!(count_term("this and that and more and less", "and"), 3);
        assert_eq!(count_term("band android", "and"), 0);
        assert_eq!(count_term("我的书的封面的颜色", "的"), 3);
    }

    #[test]
    fn test_demonstratives_are_segment_words() {
        assert!(is_segment_word("这个词"));
        assert!(is_segment_word("关于"));
        assert!(!is_segment_word("高兴"));
    }
}
