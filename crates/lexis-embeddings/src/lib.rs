//! lexis-embeddings - Embedding provider implementations for lexis.
//!
//! Every embedder returns unit-length vectors of the configured dimension,
//! so cosine similarity against the corpus index is a dot product.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - OpenAI-compatible `/embeddings` endpoints
//! - **Ollama** - Local embedding models via the Ollama `/api/embed` endpoint
//!
//! # Example
//!
//! ```ignore
//! use lexis_embeddings::EmbedderFactory;
//!
//! let embedder = EmbedderFactory::openai_with_model("text-embedding-3-small", 1024)?;
//! let vector = embedder.embed("sensible 的同义词").await?;
//! ```

mod factory;
mod ollama;
mod openai;

pub use factory::EmbedderFactory;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAIEmbedder;

// Re-export core types for convenience
pub use lexis_core::traits::{Embedder, EmbedderConfig, EmbedderProvider};

use lexis_core::error::{LexisError, LexisResult};

/// Normalise a provider vector and check it has the expected dimension.
pub(crate) fn finish_vector(vector: Vec<f32>, dims: usize) -> LexisResult<Vec<f32>> {
    if vector.len() != dims {
        return Err(LexisError::embedding(format!(
            "Expected {} dimensions, got {}",
            dims,
            vector.len()
        )));
    }
    Ok(lexis_core::traits::normalize(vector))
}
