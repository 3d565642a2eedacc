//! Declarative pattern rules for the pattern signal.
//!
//! Each rule is `(intent, regex, capture groups in preference order)`. Rules
//! are tried in table order and the first regex that matches decides the
//! intent. Adding an intent means adding rows here, not code.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::extraction::{clean_cjk_candidate, extract_target_term, is_valid_target};
use crate::types::{DetectionMethod, Intent};

use super::classifier::SignalVote;

/// Confidence when a capture group yields a valid target.
pub const CAPTURE_CONFIDENCE: f32 = 0.75;
/// Confidence when the target had to come from the extraction cascade.
pub const FALLBACK_CONFIDENCE: f32 = 0.6;
/// Confidence of the `general` result when no rule matches.
pub const NO_MATCH_CONFIDENCE: f32 = 0.3;

/// Capture class for a CJK-side term: anything up to punctuation or "的".
macro_rules! term {
    () => {
        r"([^的，,；;。.?？!！\s]{1,30}?)"
    };
}

/// Capture class for a single English word.
macro_rules! word {
    () => {
        r"([A-Za-z][A-Za-z'-]*)"
    };
}

struct PatternRule {
    intent: Intent,
    pattern: &'static str,
    groups: &'static [usize],
}

const RULES: &[PatternRule] = &[
    PatternRule {
        intent: Intent::Synonym,
        pattern: concat!(term!(), r"\s*的?\s*(?:同义词|近义词|相似词|同类词|替代词)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Synonym,
        pattern: concat!(
            r"(?i)\b(?:synonyms?\s+(?:of|for)|similar\s+words?\s+to|words\s+like)\s+",
            word!()
        ),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Antonym,
        pattern: concat!(term!(), r"\s*的?\s*(?:反义词|相反词|对立词)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Antonym,
        pattern: concat!(r"(?i)\b(?:antonyms?\s+(?:of|for)|opposite\s+of)\s+", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Comparison,
        pattern: r"([^和与跟及，,；;。.?？!！\s]{1,30}?)\s*(?:和|与|跟|及)\s*([^的，,；;。.?？!！\s]{1,30}?)\s*的?\s*(?:区别|不同|差异|差别)",
        groups: &[1, 2],
    },
    PatternRule {
        intent: Intent::Comparison,
        pattern: concat!(r"(?i)\bdifferences?\s+between\s+", word!(), r"\s+and\s+", word!()),
        groups: &[1, 2],
    },
    PatternRule {
        intent: Intent::Comparison,
        pattern: concat!(r"(?i)\b", word!(), r"\s+(?:vs\.?|versus)\s+", word!()),
        groups: &[1, 2],
    },
    PatternRule {
        intent: Intent::Definition,
        pattern: concat!(term!(), r"\s*的?\s*(?:定义|意思|含义|释义|是什么)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Definition,
        pattern: r"(?:什么是|什么叫)\s*([^，,；;。.?？!！\s]{1,30})",
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Definition,
        pattern: concat!(r"(?i)\b(?:meaning|definition)\s+of\s+(?:the\s+word\s+)?", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Definition,
        pattern: concat!(r"(?i)\b(?:what\s+is|what\s+does|define)\s+", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Example,
        pattern: concat!(term!(), r"\s*的?\s*(?:用法例句|例句|造句|例子)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Example,
        pattern: concat!(r"用\s*", word!(), r"\s*造"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Example,
        pattern: concat!(r"(?i)\b(?:examples?|sentences?)\s+(?:of|for|with)\s+", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Example,
        pattern: concat!(r"(?i)\buse\s+", word!(), r"\s+in\s+a\s+sentence"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Phrase,
        pattern: concat!(term!(), r"\s*的?\s*(?:常用搭配|固定搭配|短语|搭配|词组)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Phrase,
        pattern: concat!(r"(?i)\b(?:phrases?|collocations?|idioms?)\s+(?:of|with|for)\s+", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Pronunciation,
        pattern: concat!(term!(), r"\s*的?\s*(?:怎么读|怎么念|咋读|发音|读音|读法|音标)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Pronunciation,
        pattern: concat!(
            r"(?i)\b(?:how\s+to\s+pronounce|how\s+do\s+you\s+pronounce|pronunciation\s+of)\s+",
            word!()
        ),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Etymology,
        pattern: concat!(term!(), r"\s*的?\s*(?:词源|来源|起源|词根|由来)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Etymology,
        pattern: concat!(r"(?i)\b(?:etymology|origin|root)\s+of\s+(?:the\s+word\s+)?", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Usage,
        pattern: concat!(term!(), r"\s*的?\s*(?:怎么用|用法|语法)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Usage,
        pattern: concat!(
            r"(?i)\b(?:how\s+to\s+use|how\s+do\s+i\s+use|grammar\s+of|usage\s+of)\s+",
            word!()
        ),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::WordFamily,
        pattern: concat!(term!(), r"\s*的?\s*(?:派生词|相关词|同根词|词性|变形|词族)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::WordFamily,
        pattern: concat!(
            r"(?i)\b(?:related\s+words\s+(?:of|for|to)|derivatives?\s+of|word\s+family\s+of)\s+",
            word!()
        ),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Formality,
        pattern: concat!(term!(), r"\s*(?:是正式用语|正式吗|正式用语|口语表达|正式程度)"),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Formality,
        pattern: concat!(r"(?i)\b(?:formality|register)\s+of\s+", word!()),
        groups: &[1],
    },
    PatternRule {
        intent: Intent::Formality,
        pattern: concat!(r"(?i)\bis\s+", word!(), r"\s+(?:formal|informal|slang)\b"),
        groups: &[1],
    },
];

struct CompiledRule {
    intent: Intent,
    regex: Regex,
    groups: &'static [usize],
}

static COMPILED_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULES
        .iter()
        .filter_map(|rule| match Regex::new(rule.pattern) {
            Ok(regex) => Some(CompiledRule {
                intent: rule.intent,
                regex,
                groups: rule.groups,
            }),
            Err(e) => {
                warn!(intent = %rule.intent, error = %e, "Skipping invalid intent pattern");
                None
            }
        })
        .collect()
});

/// Run the rule table against `query`.
pub fn pattern_signal(query: &str) -> SignalVote {
    for rule in COMPILED_RULES.iter() {
        let Some(caps) = rule.regex.captures(query) else {
            continue;
        };

        let captured = rule
            .groups
            .iter()
            .filter_map(|g| caps.get(*g))
            .map(|m| clean_cjk_candidate(m.as_str()))
            .find(|candidate| is_valid_target(candidate));
        if let Some(target) = captured {
            return SignalVote::new(rule.intent, target, CAPTURE_CONFIDENCE, DetectionMethod::Pattern);
        }

        let fallback = extract_target_term(query);
        if !fallback.is_empty() {
            return SignalVote::new(
                rule.intent,
                fallback,
                FALLBACK_CONFIDENCE,
                DetectionMethod::Pattern,
            );
        }
    }

    SignalVote::new(
        Intent::General,
        extract_target_term(query),
        NO_MATCH_CONFIDENCE,
        DetectionMethod::Pattern,
    )
}
