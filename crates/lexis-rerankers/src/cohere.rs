//! Cohere-compatible reranker implementation.

use std::cmp::Ordering;

use async_trait::async_trait;
use ordered_float::OrderedFloat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{RankedDocument, Reranker, RerankerConfig};

const COHERE_API_BASE: &str = "https://api.cohere.ai/v1";

/// Reranker over a Cohere-style `/rerank` endpoint.
///
/// With a custom `base_url` (a self-hosted cross-encoder server) the API key
/// is optional.
pub struct CohereReranker {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct CohereRerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResponse {
    results: Vec<CohereRerankResult>,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResult {
    index: usize,
    relevance_score: f32,
}

impl CohereReranker {
    /// Create a new Cohere reranker.
    pub fn new(config: RerankerConfig) -> LexisResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("COHERE_API_KEY").ok());

        if api_key.is_none() && config.base_url.is_none() {
            return Err(LexisError::Configuration(
                "Cohere API key required. Set COHERE_API_KEY or provide api_key.".to_string(),
            ));
        }

        let base = config
            .base_url
            .as_deref()
            .unwrap_or(COHERE_API_BASE)
            .trim_end_matches('/');

        Ok(Self {
            client: Client::new(),
            endpoint: format!("{}/rerank", base),
            api_key,
            model: config.model,
        })
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rank(
        &self,
        query: &str,
        documents: &[String],
        top_k: usize,
    ) -> LexisResult<Vec<RankedDocument>> {
        if documents.is_empty() || top_k == 0 {
            return Ok(vec![]);
        }

        let request = CohereRerankRequest {
            model: &self.model,
            query,
            documents,
            top_n: top_k.min(documents.len()),
            return_documents: false,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LexisError::api(format!("Failed to call rerank API: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(LexisError::reranker(format!("Rerank API error: {}", error)));
        }

        let result: CohereRerankResponse = response
            .json()
            .await
            .map_err(|e| LexisError::reranker(format!("Failed to parse response: {}", e)))?;

        let ranked = collect_ranked(result.results, documents.len(), top_k);
        debug!("Reranked {} of {} documents", ranked.len(), documents.len());
        Ok(ranked)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Drop out-of-range indices, sort best first (ties by position), keep `top_k`.
fn collect_ranked(
    results: Vec<CohereRerankResult>,
    document_count: usize,
    top_k: usize,
) -> Vec<RankedDocument> {
    let mut ranked: Vec<RankedDocument> = results
        .into_iter()
        .filter(|r| r.index < document_count)
        .map(|r| RankedDocument {
            corpus_id: r.index,
            score: r.relevance_score,
        })
        .collect();

    ranked.sort_by(
        |a, b| match OrderedFloat(b.score).cmp(&OrderedFloat(a.score)) {
            Ordering::Equal => a.corpus_id.cmp(&b.corpus_id),
            other => other,
        },
    );
    ranked.truncate(top_k);
    ranked
}
