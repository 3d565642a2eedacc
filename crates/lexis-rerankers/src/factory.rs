//! Factory for creating rerankers.

use std::sync::Arc;

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{Reranker, RerankerConfig, RerankerProvider};

/// Factory for creating rerankers.
pub struct RerankerFactory;

impl RerankerFactory {
    /// Create a reranker from the given configuration.
    pub fn create(config: RerankerConfig) -> LexisResult<Arc<dyn Reranker>> {
        match config.provider {
            #[cfg(feature = "cohere")]
            RerankerProvider::Cohere => {
                let reranker = crate::cohere::CohereReranker::new(config)?;
                Ok(Arc::new(reranker))
            }

            #[allow(unreachable_patterns)]
            _ => Err(LexisError::UnsupportedProvider {
                provider: format!("{:?}", config.provider),
            }),
        }
    }
}
