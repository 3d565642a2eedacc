//! Prompt assembly for answer generation.

use serde::{Deserialize, Serialize};

use crate::types::{Intent, IntentResult};

/// Chars kept from an overflowing document must exceed this, or it is dropped.
const MIN_TRUNCATED_CHARS: usize = 100;

/// Packs retrieved documents into a bounded context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextAssembler {
    pub max_documents: usize,
    /// Character budget across all documents.
    pub max_chars: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            max_documents: 5,
            max_chars: 4000,
        }
    }
}

impl ContextAssembler {
    /// Take documents in order until the budget runs out. The document that
    /// overflows is cut and suffixed with "..." when more than 100 characters
    /// of budget remain; otherwise it is dropped.
    pub fn assemble<'a, I>(&self, documents: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut out = Vec::new();
        let mut total = 0usize;
        for content in documents.into_iter().take(self.max_documents) {
            let length = content.chars().count();
            if total + length < self.max_chars {
                out.push(content.to_string());
                total += length;
                continue;
            }
            let remaining = self.max_chars.saturating_sub(total);
            if remaining > MIN_TRUNCATED_CHARS {
                let mut truncated: String = content.chars().take(remaining).collect();
                truncated.push_str("...");
                out.push(truncated);
            }
            break;
        }
        out
    }
}

/// Answer-format instructions for an intent. `term` names the word asked about.
pub fn intent_instruction(intent: Intent, term: &str) -> String {
    match intent {
        Intent::Definition => format!(
            "请为单词 {term} 给出面向学习者的释义：按词性分段，每个词性给出简短中文释义和英文解释，并注明是否常用。"
        ),
        Intent::Synonym => format!(
            "请列出 {term} 的同义词，按语义接近程度分为强同义、中等相似、弱相关三组，每组不超过 5 个，附简短中文解释。没有同义词时请明确说明。"
        ),
        Intent::Antonym => format!(
            "请列出 {term} 的反义词，每个附不超过 8 字的中文解释，并按场景分类。没有典型反义词时说明原因。"
        ),
        Intent::Example => format!(
            "请为 {term} 提供 3~5 个自然、简短的例句，覆盖不同词性或语境，每句附中文翻译。"
        ),
        Intent::Phrase | Intent::Usage => format!(
            "请给出 {term} 的常见搭配（英文加中文解释）、典型语法行为和学习者常见误用。"
        ),
        Intent::Etymology => format!(
            "请用不超过 3 行说明 {term} 的词源。词源不确定时请说明存在多种解释，不要猜测。"
        ),
        Intent::Pronunciation => format!(
            "请给出 {term} 的英式和美式 IPA 音标、重音位置和简短发音提示。"
        ),
        Intent::Comparison => format!(
            "请对比 {term} 与相关词的区别：含义、语气、常见搭配，并各给一个例句。"
        ),
        Intent::WordFamily => format!("请列出 {term} 的派生词和不同词性形式，附中文释义。"),
        Intent::Formality => format!(
            "请说明 {term} 的正式程度（正式、中性、口语、俚语），并给出适用场合和替代表达。"
        ),
        Intent::General => format!(
            "请为 {term} 提供结构化信息：释义、同义词、反义词、常见搭配、例句、发音和词源（如有），用“##”作为标题分段。"
        ),
    }
}

/// The learner-assistant prompt sent to the generator.
pub fn build_answer_prompt(query: &str, intent: &IntentResult, documents: &[String]) -> String {
    let term = if intent.has_target() {
        intent.target_term.as_str()
    } else {
        query
    };
    let materials = if documents.is_empty() {
        "（无）".to_string()
    } else {
        documents
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("[{}] {doc}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "你是一位专业的英语学习助手，请根据用户的问题和提供的英语学习资料生成准确、有用的回答。\n\n\
         用户问题: {query}\n\n\
         相关学习资料:\n{materials}\n\n\
         回答格式:\n{instruction}\n\n\
         请遵守以下要求:\n\
         1. 基于提供的资料回答，不要编造不存在的信息\n\
         2. 资料中有多个相关解释时，整合最相关的内容\n\
         3. 回答清晰准确，适合英语学习者理解\n\
         4. 资料不足时，说明哪些信息需要补充\n\n\
         请开始回答：",
        instruction = intent_instruction(intent.intent, term),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionMethod;

    #[test]
    fn test_assemble_respects_document_limit() {
        let docs = ["a"; 8];
        let assembled = ContextAssembler::default().assemble(docs.iter().copied());
        assert_eq!(assembled.len(), 5);
    }

    #[test]
    fn test_assemble_truncates_overflowing_document() {
        let assembler = ContextAssembler {
            max_documents: 5,
            max_chars: 300,
        };
        let first = "x".repeat(150);
        let second = "y".repeat(400);
        let assembled = assembler.assemble([first.as_str(), second.as_str()]);
        assert_eq!(assembled.len(), 2);
        assert_eq!(assembled[1], format!("{}...", "y".repeat(150)));
    }

    #[test]
    fn test_assemble_drops_small_remainder() {
        let assembler = ContextAssembler {
            max_documents: 5,
            max_chars: 300,
        };
        let first = "x".repeat(250);
        let second = "y".repeat(400);
        let assembled = assembler.assemble([first.as_str(), second.as_str()]);
        assert_eq!(assembled, vec![first]);
    }

    #[test]
    fn test_prompt_includes_intent_instruction() {
        let intent = IntentResult::new(Intent::Synonym, "sensible", 0.9, DetectionMethod::Keyword);
        let prompt = build_answer_prompt(
            "sensible的同义词有哪些",
            &intent,
            &["sensible 同近义词: wise".to_string()],
        );
        assert!(prompt.contains("用户问题: sensible的同义词有哪些"));
        assert!(prompt.contains("[1] sensible 同近义词: wise"));
        assert!(prompt.contains("请列出 sensible 的同义词"));
    }

    #[test]
    fn test_prompt_without_target_or_documents() {
        let prompt = build_answer_prompt("hello", &IntentResult::empty(), &[]);
        assert!(prompt.contains("（无）"));
        assert!(prompt.contains("请为 hello 提供结构化信息"));
    }
}
