//! Factory for creating embedding providers.

use std::sync::Arc;

use lexis_core::error::LexisResult;
use lexis_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};

use crate::ollama::OllamaEmbedder;
use crate::openai::OpenAIEmbedder;

/// Factory for creating embedding providers.
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an embedder from the given configuration.
    pub fn create(config: EmbedderConfig) -> LexisResult<Arc<dyn Embedder>> {
        match config.provider {
            EmbedderProvider::OpenAI => {
                let embedder = OpenAIEmbedder::new(config)?;
                Ok(Arc::new(embedder))
            }
            EmbedderProvider::Ollama => {
                let embedder = OllamaEmbedder::new(config)?;
                Ok(Arc::new(embedder))
            }
        }
    }

    /// Create an OpenAI embedder with a specific model.
    pub fn openai_with_model(model: impl Into<String>, dims: usize) -> LexisResult<Arc<dyn Embedder>> {
        Self::create(EmbedderConfig {
            provider: EmbedderProvider::OpenAI,
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        })
    }

    /// Create an Ollama embedder with a specific model.
    pub fn ollama_with_model(model: impl Into<String>, dims: usize) -> LexisResult<Arc<dyn Embedder>> {
        Self::create(EmbedderConfig {
            provider: EmbedderProvider::Ollama,
            model: model.into(),
            embedding_dims: dims,
            ..Default::default()
        })
    }
}
