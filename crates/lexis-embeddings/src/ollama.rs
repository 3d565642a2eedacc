//! Ollama embedding provider over the `/api/embed` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{Embedder, EmbedderConfig};

use crate::finish_vector;

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedding provider.
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    config: EmbedderConfig,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder.
    pub fn new(config: EmbedderConfig) -> LexisResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let url = url::Url::parse(&base_url)
            .map_err(|e| LexisError::Configuration(format!("Invalid Ollama URL: {}", e)))?;
        let endpoint = url
            .join("api/embed")
            .map_err(|e| LexisError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            config,
        })
    }

    async fn request(&self, input: serde_json::Value) -> LexisResult<Vec<Vec<f32>>> {
        let body = json!({
            "model": self.config.model,
            "input": input,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LexisError::api(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(LexisError::embedding(format!(
                "Ollama embedding error: {}",
                error
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| LexisError::embedding(format!("Failed to parse response: {}", e)))?;

        debug!("Ollama returned {} embeddings", parsed.embeddings.len());
        parsed
            .embeddings
            .into_iter()
            .map(|v| finish_vector(v, self.config.embedding_dims))
            .collect()
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> LexisResult<Vec<f32>> {
        self.request(json!(text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LexisError::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[String]) -> LexisResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(json!(texts)).await
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base_url() {
        let embedder = OllamaEmbedder::new(EmbedderConfig {
            base_url: Some("http://gpu-box:11434/".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(embedder.endpoint, "http://gpu-box:11434/api/embed");
    }

    #[test]
    fn test_invalid_url() {
        let result = OllamaEmbedder::new(EmbedderConfig {
            base_url: Some("::not a url".to_string()),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_response_shape() {
        let parsed: EmbedResponse =
            serde_json::from_str(r#"{"model":"bge-m3","embeddings":[[0.1,0.2],[0.3,0.4]]}"#)
                .unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
    }
}
