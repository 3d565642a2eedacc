//! Template-based rewrite generators.

use crate::types::{Language, QueryProfile, QueryType, RewriteStrategy};

/// A rewrite before scoring.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Draft {
    pub query: String,
    pub strategy: RewriteStrategy,
    pub note: &'static str,
}

impl Draft {
    pub fn new(query: impl Into<String>, strategy: RewriteStrategy, note: &'static str) -> Self {
        Self {
            query: query.into(),
            strategy,
            note,
        }
    }
}

fn main_term<'a>(profile: &'a QueryProfile) -> &'a str {
    profile
        .key_terms
        .first()
        .map(String::as_str)
        .unwrap_or(profile.text.as_str())
}

pub(crate) fn expand(profile: &QueryProfile) -> Vec<Draft> {
    let base = main_term(profile);
    let s = RewriteStrategy::Expand;
    let mut drafts = vec![
        Draft::new(format!("{base} 的定义和详细解释"), s, "add definition and context"),
        Draft::new(format!("{base} 的应用场景和示例"), s, "show usage examples"),
    ];
    if profile.language == Language::En {
        drafts.push(Draft::new(
            format!("Definition and detailed explanation of {base}"),
            s,
            "english expansion",
        ));
        drafts.push(Draft::new(
            format!("Practical examples and use-cases for {base}"),
            s,
            "english examples",
        ));
    }
    if profile.query_type == QueryType::Comparison && profile.key_terms.len() >= 2 {
        let (a, b) = (&profile.key_terms[0], &profile.key_terms[1]);
        drafts.push(Draft::new(format!("{a} 与 {b} 对比"), s, "comparison expansion"));
    }
    drafts
}

fn simple_version(profile: &QueryProfile) -> String {
    let primary = main_term(profile);
    match profile.query_type {
        QueryType::Definition => format!("{primary} 定义"),
        QueryType::Synonym => format!("{primary} 近义词"),
        QueryType::Example => format!("{primary} 例子"),
        QueryType::Usage => format!("{primary} 用法"),
        QueryType::Comparison if profile.key_terms.len() > 1 => {
            format!("{} 对比 {}", profile.key_terms[0], profile.key_terms[1])
        }
        _ => primary.to_string(),
    }
}

pub(crate) fn simplify(profile: &QueryProfile) -> Vec<Draft> {
    let s = RewriteStrategy::Simplify;
    let mut drafts = Vec::new();
    if profile.key_terms.len() >= 2 {
        drafts.push(Draft::new(
            format!("{} 和 {} 的区别", profile.key_terms[0], profile.key_terms[1]),
            s,
            "extract comparison core",
        ));
    }
    let asks_definition = profile.text.contains("是什么")
        || profile.text.contains("什么是")
        || (profile.language == Language::En && profile.text.to_lowercase().contains("what"));
    if asks_definition {
        drafts.push(Draft::new(
            format!("{} 的定义", main_term(profile)),
            s,
            "definition simplification",
        ));
    }
    drafts.push(Draft::new(simple_version(profile), s, "general simplification"));
    drafts
}

pub(crate) fn paraphrase(profile: &QueryProfile) -> Vec<Draft> {
    let main = main_term(profile);
    let s = RewriteStrategy::Paraphrase;
    let mut drafts: Vec<Draft> = [
        format!("请解释{main}"),
        format!("什么是{main}"),
        format!("能不能介绍一下{main}"),
        format!("{main}是什么意思"),
        format!("如何理解{main}"),
        format!("请说明{main}"),
        format!("{main}的定义是什么"),
    ]
    .into_iter()
    .map(|q| Draft::new(q, s, "pattern paraphrase"))
    .collect();

    if profile.language == Language::En {
        drafts.extend(
            [
                format!("Explain {main}"),
                format!("What is {main}?"),
                format!("How to understand {main}?"),
                format!("Definition of {main}"),
            ]
            .into_iter()
            .map(|q| Draft::new(q, s, "en paraphrase")),
        );
    }

    let lower = profile.text.to_lowercase();
    if ["用法", "怎么用", "how to", "use"]
        .iter()
        .any(|cue| lower.contains(cue))
    {
        drafts.push(Draft::new(
            format!("{main} 的使用方法和注意事项"),
            s,
            "usage paraphrase",
        ));
    }
    drafts
}

pub(crate) fn clarify(profile: &QueryProfile) -> Vec<Draft> {
    let s = RewriteStrategy::Clarify;
    let query = &profile.text;
    let mut drafts = Vec::new();
    if profile.key_terms.len() >= 2 {
        let (a, b) = (&profile.key_terms[0], &profile.key_terms[1]);
        drafts.push(Draft::new(
            format!("{query}，请具体说明您是关心{a}还是{b}?"),
            s,
            "ask which term",
        ));
        drafts.push(Draft::new(
            format!("关于{a}和{b}的关系，您想要比较还是了解各自定义?"),
            s,
            "clarify intent",
        ));
    }
    drafts.push(Draft::new(
        format!("{query} 的具体含义和应用是什么?"),
        s,
        "generic clarification",
    ));
    drafts
}

pub(crate) fn multi_perspective(profile: &QueryProfile) -> Vec<Draft> {
    let s = RewriteStrategy::MultiPerspective;
    let main = profile
        .key_terms
        .first()
        .map(String::as_str)
        .unwrap_or("相关内容");

    let templates: [(String, &'static str); 5] = if profile.language == Language::En {
        [
            (format!("basic definition of {main}"), "definition"),
            (format!("key features of {main}"), "features"),
            (format!("common usage and examples of {main}"), "usage_examples"),
            (format!("related terms of {main}"), "related_terms"),
            (format!("learning tips for {main}"), "learning_tips"),
        ]
    } else {
        [
            (format!("{main} 的基本定义和概念"), "definition"),
            (format!("{main} 的主要特点和特征"), "features"),
            (format!("{main} 的常见用法和例子"), "usage_examples"),
            (format!("{main} 的相关术语和概念"), "related_terms"),
            (format!("{main} 的学习要点和注意事项"), "learning_tips"),
        ]
    };
    templates
        .into_iter()
        .map(|(q, note)| Draft::new(q, s, note))
        .collect()
}
