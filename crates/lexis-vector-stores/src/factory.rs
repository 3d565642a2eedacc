//! Factory for creating corpus indexes.

use std::sync::Arc;

use lexis_core::error::{LexisError, LexisResult};
use lexis_core::traits::{IndexConfig, IndexProvider, VectorIndex};

use crate::memory::MemoryIndex;

/// Factory for creating corpus indexes.
pub struct IndexFactory;

impl IndexFactory {
    /// Create an index from the given configuration.
    pub async fn create(config: &IndexConfig) -> LexisResult<Arc<dyn VectorIndex>> {
        match config.provider {
            IndexProvider::Memory => {
                let index = match &config.corpus_path {
                    Some(path) => {
                        MemoryIndex::from_jsonl(path, config.collection_name.clone()).await?
                    }
                    None => MemoryIndex::new(config.collection_name.clone(), Vec::new()),
                };
                Ok(Arc::new(index))
            }

            #[cfg(feature = "milvus")]
            IndexProvider::Milvus => {
                let index = crate::milvus::MilvusIndex::new(config)?;
                Ok(Arc::new(index))
            }

            #[allow(unreachable_patterns)]
            _ => Err(LexisError::UnsupportedProvider {
                provider: format!("{:?}", config.provider),
            }),
        }
    }
}
