//! Intent taxonomy and classification results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// What a learner wants to know about a term.
///
/// Serializes to snake_case. `usage_note` is accepted as a legacy spelling of
/// [`Intent::Usage`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Words with a similar meaning.
    Synonym,
    /// Words with the opposite meaning.
    Antonym,
    /// What the term means.
    Definition,
    /// Example sentences.
    Example,
    /// Collocations and set phrases.
    Phrase,
    /// How the term is pronounced.
    Pronunciation,
    /// Where the term comes from.
    Etymology,
    /// How two terms differ.
    Comparison,
    /// How the term is used correctly.
    #[serde(alias = "usage_note")]
    #[strum(to_string = "usage", serialize = "usage_note")]
    Usage,
    /// Derived and related forms.
    WordFamily,
    /// Register: formal, informal, slang.
    Formality,
    /// Anything else.
    #[default]
    General,
}

impl Intent {
    /// The snake_case label.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// All intents in classification order.
    pub fn all() -> Vec<Intent> {
        Self::iter().collect()
    }

    /// The corpus chunk type that best answers this intent, if any.
    pub fn expected_chunk_type(&self) -> Option<ChunkType> {
        match self {
            Intent::Synonym | Intent::Antonym | Intent::WordFamily => {
                Some(ChunkType::SemanticNetwork)
            }
            Intent::Definition | Intent::Pronunciation => Some(ChunkType::Definition),
            Intent::Example => Some(ChunkType::Examples),
            Intent::Phrase | Intent::Usage => Some(ChunkType::Phrases),
            _ => None,
        }
    }

    /// Cue words appended to the semantic query when a target term is known.
    pub fn query_cues(&self) -> Option<&'static str> {
        match self {
            Intent::Synonym => Some("同义词 近义词 相似词 synonyms similar words"),
            Intent::Example => Some("例句 例子 用法 example usage"),
            Intent::Antonym => Some("反义词 antonyms opposite"),
            Intent::Phrase => Some("短语 搭配 phrases collocations"),
            _ => None,
        }
    }

    /// Marker strings that indicate a chunk densely covers this intent.
    pub fn density_markers(&self) -> &'static [&'static str] {
        match self {
            Intent::Synonym => &["同近义词", "synonym"],
            Intent::Antonym => &["反义词", "antonym"],
            Intent::Example => &["例句", "example"],
            Intent::Phrase => &["搭配", "短语", "phrase"],
            Intent::Definition => &["释义", "definition"],
            _ => &[],
        }
    }
}

/// Kinds of corpus chunks.
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
pub enum ChunkType {
    Definition,
    Examples,
    Phrases,
    SemanticNetwork,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Which signal produced an intent decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Keyword,
    Semantic,
    Pattern,
    Combined,
}

/// The outcome of intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Detected intent.
    pub intent: Intent,
    /// The term the query is about. Empty when none could be found.
    pub target_term: String,
    /// Confidence in [0, 1].
    pub confidence: f32,
    /// Which signal decided.
    pub method: DetectionMethod,
    /// Combined per-intent scores, when the signals were combined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<BTreeMap<Intent, f32>>,
}

impl IntentResult {
    /// A result with no per-intent breakdown.
    pub fn new(
        intent: Intent,
        target_term: impl Into<String>,
        confidence: f32,
        method: DetectionMethod,
    ) -> Self {
        Self {
            intent,
            target_term: target_term.into(),
            confidence: confidence.clamp(0.0, 1.0),
            method,
            scores: None,
        }
    }

    /// The `general` result returned for empty input.
    pub fn empty() -> Self {
        Self::new(Intent::General, "", 0.0, DetectionMethod::Keyword)
    }

    pub fn has_target(&self) -> bool {
        !self.target_term.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_intent_labels() {
        assert_eq!(Intent::WordFamily.as_str(), "word_family");
        assert_eq!(Intent::Usage.to_string(), "usage");
        assert_eq!(Intent::from_str("usage_note").ok(), Some(Intent::Usage));
        assert_eq!(Intent::all().len(), 12);
        assert_eq!(Intent::default(), Intent::General);
    }

    #[test]
    fn test_usage_note_alias_deserializes() {
        let intent: Intent = serde_json::from_str("\"usage_note\"").unwrap();
        assert_eq!(intent, Intent::Usage);
        assert_eq!(serde_json::to_string(&intent).unwrap(), "\"usage\"");
    }

    #[test]
    fn test_expected_chunk_types() {
        assert_eq!(
            Intent::Synonym.expected_chunk_type(),
            Some(ChunkType::SemanticNetwork)
        );
        assert_eq!(
            Intent::Definition.expected_chunk_type(),
            Some(ChunkType::Definition)
        );
        assert_eq!(Intent::Example.expected_chunk_type(), Some(ChunkType::Examples));
        assert_eq!(Intent::General.expected_chunk_type(), None);
        assert_eq!(ChunkType::SemanticNetwork.as_str(), "semantic_network");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let result = IntentResult::new(Intent::Synonym, "happy", 1.4, DetectionMethod::Keyword);
        assert_eq!(result.confidence, 1.0);
        assert!(result.has_target());
        assert!(!IntentResult::empty().has_target());
    }
}
