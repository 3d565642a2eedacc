//! Cross-encoder reranking of retrieved candidates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LexisResult;
use crate::traits::{RankedDocument, Reranker};
use crate::types::RankedCandidate;

/// A reranked document mapped back to its retrieval position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedDocument {
    /// Position in the list sent to the reranker.
    pub corpus_id: usize,
    pub score: f32,
    /// `None` when the reranker returned an out-of-range position.
    pub content: Option<String>,
    /// Corpus chunk id, when the position was valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
}

/// The query as the reranker expects it.
pub fn format_instruction(instruction: &str, query: &str) -> String {
    format!("<Instruct>: {instruction}\n<Query>: {query}")
}

/// Map reranker positions back onto the candidates that were sent.
pub fn map_to_candidates(
    candidates: &[RankedCandidate],
    ranked: Vec<RankedDocument>,
) -> Vec<RerankedDocument> {
    ranked
        .into_iter()
        .map(|doc| {
            let source = candidates.get(doc.corpus_id);
            RerankedDocument {
                corpus_id: doc.corpus_id,
                score: doc.score,
                content: source.map(|c| c.content().to_string()),
                chunk_id: source.map(|c| c.id().to_string()),
            }
        })
        .collect()
}

/// Rerank `candidates` for `query` with a cross-encoder.
pub async fn rerank_candidates(
    reranker: &dyn Reranker,
    instruction: &str,
    query: &str,
    candidates: &[RankedCandidate],
    top_k: usize,
) -> LexisResult<Vec<RerankedDocument>> {
    if candidates.is_empty() || top_k == 0 {
        return Ok(Vec::new());
    }
    let formatted = format_instruction(instruction, query);
    let documents: Vec<String> = candidates.iter().map(|c| c.content().to_string()).collect();
    let ranked = reranker.rank(&formatted, &documents, top_k).await?;
    debug!(
        model = reranker.model_name(),
        sent = documents.len(),
        returned = ranked.len(),
        "Reranked candidates"
    );
    Ok(map_to_candidates(candidates, ranked))
}
