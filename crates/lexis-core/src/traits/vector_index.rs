//! Vector index trait over the vocabulary corpus.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LexisResult;
use crate::types::{Candidate, Filter, StrategyKind};

/// A corpus chunk returned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    pub id: String,
    pub content: String,
    pub word: String,
    pub chunk_type: String,
    /// Cosine similarity for vector searches, 1.0 for filter queries.
    pub score: f32,
}

impl IndexHit {
    /// Convert into a candidate attributed to `strategy`.
    pub fn into_candidate(self, strategy: StrategyKind, score: f32) -> Candidate {
        Candidate {
            id: self.id,
            content: self.content,
            word: self.word,
            chunk_type: self.chunk_type,
            strategy,
            score,
        }
    }
}

/// Read access to an indexed corpus of `{id, content, word, chunk_type, vector}`
/// records.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Nearest neighbours by cosine similarity, best first.
    async fn semantic_search(&self, vector: &[f32], limit: usize) -> LexisResult<Vec<IndexHit>>;

    /// Records matching `filter`, in storage order.
    async fn filter_query(&self, filter: &Filter, limit: usize) -> LexisResult<Vec<IndexHit>>;

    /// Name of the underlying collection.
    fn collection_name(&self) -> &str;
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Provider type.
    #[serde(default)]
    pub provider: IndexProvider,
    /// Collection name.
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    /// Server URL, for remote indexes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Access token, for remote indexes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// JSON Lines corpus file, for the in-memory index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corpus_path: Option<String>,
    /// Vector dimensions.
    #[serde(default = "default_dims")]
    pub embedding_dims: usize,
}

fn default_collection_name() -> String {
    "vocabulary".to_string()
}

fn default_dims() -> usize {
    1024
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            provider: IndexProvider::default(),
            collection_name: default_collection_name(),
            url: None,
            token: None,
            corpus_path: None,
            embedding_dims: default_dims(),
        }
    }
}

/// Vector index provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexProvider {
    #[default]
    Memory,
    Milvus,
}
