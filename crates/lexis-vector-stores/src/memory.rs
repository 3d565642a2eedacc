//! In-memory corpus index backed by a JSON Lines file.

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{cosine_similarity, Embedder, IndexHit, VectorIndex};
use lexis_core::types::Filter;

/// Stable chunk id: md5 hex of `{word}_{chunk_type}_{first 50 chars of content}`.
pub fn chunk_id(word: &str, chunk_type: &str, content: &str) -> String {
    let prefix: String = content.chars().take(50).collect();
    format!("{:x}", md5::compute(format!("{word}_{chunk_type}_{prefix}")))
}

/// One line of a corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusRecord {
    #[serde(default)]
    pub id: String,
    pub content: String,
    pub word: String,
    pub chunk_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vector: Vec<f32>,
}

impl CorpusRecord {
    pub fn new(
        word: impl Into<String>,
        chunk_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let word = word.into();
        let chunk_type = chunk_type.into();
        let content = content.into();
        Self {
            id: chunk_id(&word, &chunk_type, &content),
            content,
            word,
            chunk_type,
            vector: Vec::new(),
        }
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = vector;
        self
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(&self.id),
            "content" => Some(&self.content),
            "word" => Some(&self.word),
            "chunk_type" => Some(&self.chunk_type),
            _ => None,
        }
    }

    fn to_hit(&self, score: f32) -> IndexHit {
        IndexHit {
            id: self.id.clone(),
            content: self.content.clone(),
            word: self.word.clone(),
            chunk_type: self.chunk_type.clone(),
            score,
        }
    }
}

/// Corpus index held entirely in memory.
///
/// Semantic search is a linear cosine scan; records without a vector are
/// reachable through filter queries only.
pub struct MemoryIndex {
    collection: String,
    records: Vec<CorpusRecord>,
}

impl MemoryIndex {
    /// Create an index over `records`, assigning ids to records that lack one.
    pub fn new(collection: impl Into<String>, records: Vec<CorpusRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                if record.id.is_empty() {
                    record.id = chunk_id(&record.word, &record.chunk_type, &record.content);
                }
                record
            })
            .collect();
        Self {
            collection: collection.into(),
            records,
        }
    }

    /// Load a JSON Lines corpus. Blank lines are skipped.
    pub async fn from_jsonl(
        path: impl AsRef<Path>,
        collection: impl Into<String>,
    ) -> LexisResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let records = parse_jsonl(&raw)?;
        info!(
            "Loaded {} corpus records from {}",
            records.len(),
            path.display()
        );
        Ok(Self::new(collection, records))
    }

    /// Embed every record that has no vector yet. Returns how many were embedded.
    pub async fn embed_missing(&mut self, embedder: &dyn Embedder) -> LexisResult<usize> {
        let pending: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.vector.is_empty())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = pending
            .iter()
            .map(|&i| self.records[i].content.clone())
            .collect();
        let vectors = embedder.embed_batch(&texts).await?;
        if vectors.len() != pending.len() {
            return Err(LexisError::embedding(format!(
                "Expected {} embeddings, got {}",
                pending.len(),
                vectors.len()
            )));
        }

        for (i, vector) in pending.iter().zip(vectors) {
            self.records[*i].vector = vector;
        }
        debug!("Embedded {} corpus records", pending.len());
        Ok(pending.len())
    }

    pub fn records(&self) -> &[CorpusRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_jsonl(raw: &str) -> LexisResult<Vec<CorpusRecord>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .map_err(|e| LexisError::parse(format!("Corpus line {}: {}", n + 1, e)))
        })
        .collect()
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn semantic_search(&self, vector: &[f32], limit: usize) -> LexisResult<Vec<IndexHit>> {
        let mut scored: Vec<(f32, &CorpusRecord)> = self
            .records
            .iter()
            .filter(|r| r.vector.len() == vector.len())
            .map(|r| (cosine_similarity(vector, &r.vector), r))
            .collect();

        scored.sort_by(|a, b| match OrderedFloat(b.0).cmp(&OrderedFloat(a.0)) {
            Ordering::Equal => a.1.id.cmp(&b.1.id),
            other => other,
        });

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, record)| record.to_hit(score))
            .collect())
    }

    async fn filter_query(&self, filter: &Filter, limit: usize) -> LexisResult<Vec<IndexHit>> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.evaluate(&|name| r.field(name)))
            .take(limit)
            .map(|r| r.to_hit(1.0))
            .collect())
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }
}
