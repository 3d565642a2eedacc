//! OpenAI-compatible embedding provider.

use async_trait::async_trait;

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{Embedder, EmbedderConfig};

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};

#[cfg(feature = "openai")]
use crate::finish_vector;

/// OpenAI embedding provider. `base_url` points it at any compatible server.
pub struct OpenAIEmbedder {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    config: EmbedderConfig,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder.
    pub fn new(config: EmbedderConfig) -> LexisResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                LexisError::Configuration("OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        #[cfg(feature = "openai")]
        let openai_config = if let Some(ref base_url) = config.base_url {
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(base_url)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        #[cfg(not(feature = "openai"))]
        let _ = api_key;

        Ok(Self {
            #[cfg(feature = "openai")]
            client: Client::with_config(openai_config),
            config,
        })
    }

    #[cfg(feature = "openai")]
    fn request(&self, input: EmbeddingInput) -> CreateEmbeddingRequest {
        CreateEmbeddingRequest {
            model: self.config.model.clone(),
            input,
            dimensions: Some(self.config.embedding_dims as u32),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[cfg(feature = "openai")]
    async fn embed(&self, text: &str) -> LexisResult<Vec<f32>> {
        let response = self
            .client
            .embeddings()
            .create(self.request(EmbeddingInput::String(text.to_string())))
            .await
            .map_err(|e| LexisError::embedding(format!("OpenAI embedding error: {}", e)))?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| LexisError::embedding("No embedding returned"))?;

        finish_vector(embedding.embedding, self.config.embedding_dims)
    }

    #[cfg(not(feature = "openai"))]
    async fn embed(&self, _text: &str) -> LexisResult<Vec<f32>> {
        Err(LexisError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    #[cfg(feature = "openai")]
    async fn embed_batch(&self, texts: &[String]) -> LexisResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .embeddings()
            .create(self.request(EmbeddingInput::StringArray(texts.to_vec())))
            .await
            .map_err(|e| LexisError::embedding(format!("OpenAI embedding error: {}", e)))?;

        let mut data = response.data;
        data.sort_by_key(|e| e.index);
        data.into_iter()
            .map(|e| finish_vector(e.embedding, self.config.embedding_dims))
            .collect()
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
