//! Cross-encoder reranker trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LexisResult;

/// A reranker verdict for one document, identified by its position in the
/// input slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDocument {
    pub corpus_id: usize,
    pub score: f32,
}

/// Core Reranker trait - all reranker providers implement this.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score `documents` against `query`, best first, at most `top_k`.
    async fn rank(
        &self,
        query: &str,
        documents: &[String],
        top_k: usize,
    ) -> LexisResult<Vec<RankedDocument>>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// Reranker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: RerankerProvider,
    /// Model name/identifier.
    pub model: String,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Top-N results to keep.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Task instruction prepended to the query.
    #[serde(default = "default_instruction")]
    pub instruction: String,
}

fn default_top_n() -> usize {
    5
}

fn default_instruction() -> String {
    "Given a learner's question about an English word, judge whether the dictionary entry answers it"
        .to_string()
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            provider: RerankerProvider::default(),
            model: "rerank-multilingual-v3.0".to_string(),
            api_key: None,
            base_url: None,
            top_n: default_top_n(),
            instruction: default_instruction(),
        }
    }
}

/// Reranker provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerankerProvider {
    /// Cohere-compatible `/rerank` endpoint.
    #[default]
    Cohere,
}
