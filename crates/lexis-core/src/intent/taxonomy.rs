//! Keyword and example tables per intent.
//!
//! Table order is evaluation order: relation intents (synonym, antonym,
//! comparison) come before definition so that "A和B的区别是什么" is not read
//! as a definition request.

use crate::types::Intent;

/// Cue data for one intent.
#[derive(Debug)]
pub struct IntentProfile {
    pub intent: Intent,
    /// CJK keywords match as substrings, Latin keywords on word boundaries.
    pub keywords: &'static [&'static str],
    /// Representative queries for similarity matching.
    pub examples: &'static [&'static str],
}

pub static TAXONOMY: &[IntentProfile] = &[
    IntentProfile {
        intent: Intent::Synonym,
        keywords: &[
            "同义词", "近义词", "相似词", "同类词", "意思相近的词", "替代词", "替换词", "synonym",
            "synonyms", "similar", "alternative word", "thesaurus",
        ],
        examples: &[
            "sensible的同义词有哪些",
            "beautiful的近义词",
            "与happy意思相近的词汇",
            "列出important的同义词",
            "有什么词可以替换good",
            "words like happy",
        ],
    },
    IntentProfile {
        intent: Intent::Antonym,
        keywords: &["反义词", "相反词", "对立词", "antonym", "antonyms", "opposite"],
        examples: &[
            "happy的反义词",
            "big的相反词是什么",
            "列出rich的反义词",
            "antonym of good",
            "opposite of fast",
        ],
    },
    IntentProfile {
        intent: Intent::Comparison,
        keywords: &[
            "区别", "不同", "差异", "差别", "比较", "比对", "对比", "分辨", "区分", "有何不同",
            "difference", "compare", "comparison", "distinguish", "vs", "versus",
        ],
        examples: &[
            "sensible和sensitive的区别",
            "affect和effect的不同",
            "这两个词有什么不同",
            "say和tell有何不同",
            "difference between big and large",
        ],
    },
    IntentProfile {
        intent: Intent::Definition,
        keywords: &[
            "定义", "意思", "含义", "释义", "解释", "什么意思", "什么叫", "什么是", "啥意思", "翻译",
            "define", "definition", "meaning", "what does it mean",
        ],
        examples: &[
            "sensible的定义是什么",
            "explain的意思",
            "什么是metaphor",
            "ambiguity是什么意思",
            "什么叫paradox",
            "ephemeral的含义",
            "meaning of serendipity",
        ],
    },
    IntentProfile {
        intent: Intent::Example,
        keywords: &[
            "例句", "例子", "造句", "举例", "造个句", "用例", "example", "examples",
            "sentence", "in a sentence",
        ],
        examples: &[
            "sensible的用法例句",
            "用demonstrate造个句子",
            "illustrate的例句有哪些",
            "provide an example of analyze",
            "举几个mitigate的例子",
        ],
    },
    IntentProfile {
        intent: Intent::Phrase,
        keywords: &[
            "短语", "搭配", "词组", "固定搭配", "常用搭配", "习惯搭配", "词伙", "phrase", "phrases",
            "collocation", "idiom", "word partnership",
        ],
        examples: &[
            "sensible的常用搭配",
            "make的短语搭配",
            "take的常见词组",
            "break的固定搭配",
            "phrases with get",
        ],
    },
    IntentProfile {
        intent: Intent::Pronunciation,
        keywords: &[
            "发音", "读音", "怎么读", "怎么念", "念法", "咋读", "读法", "音标", "pronunciation",
            "pronounce", "how to pronounce", "phonetic",
        ],
        examples: &[
            "sensible怎么读",
            "schedule的美式发音",
            "读一下entrepreneur",
            "colonel咋读",
            "how to pronounce colonel",
        ],
    },
    IntentProfile {
        intent: Intent::Etymology,
        keywords: &[
            "词源", "词根", "词缀", "来源", "起源", "由来", "出自", "词源学", "etymology", "origin",
            "word origin", "where does it come from",
        ],
        examples: &[
            "sensible的词源",
            "photograph的词源学",
            "philosophy的起源",
            "biology的词根是什么",
            "origin of the word salary",
        ],
    },
    IntentProfile {
        intent: Intent::Usage,
        keywords: &[
            "用法", "使用", "怎么用", "用法注意", "使用场景", "适用场合", "语法", "usage",
            "how to use", "grammar", "in what situation",
        ],
        examples: &[
            "however的用法",
            "suggest怎么用",
            "recommend的语法",
            "在什么场合用这个词",
            "how to use however",
        ],
    },
    IntentProfile {
        intent: Intent::WordFamily,
        keywords: &[
            "词性", "派生词", "相关词", "同根词", "词族", "形容词", "副词", "名词", "动词", "变形",
            "part of speech", "derivative", "related words", "adjective", "adverb", "noun", "verb",
        ],
        examples: &[
            "beautiful的词性",
            "happy的派生词",
            "create的相关词",
            "名词形式是什么",
            "related words of create",
        ],
    },
    IntentProfile {
        intent: Intent::Formality,
        keywords: &[
            "正式", "非正式", "口语", "书面语", "俚语", "委婉语", "正式程度", "formal", "informal",
            "slang", "colloquial", "register",
        ],
        examples: &[
            "kids是正式用语吗",
            "wanna的正式程度",
            "这个词正式吗",
            "口语表达有哪些",
            "is gonna informal",
        ],
    },
];

/// The cue profile for `intent`. `general` has none.
pub fn profile(intent: Intent) -> Option<&'static IntentProfile> {
    TAXONOMY.iter().find(|p| p.intent == intent)
}
