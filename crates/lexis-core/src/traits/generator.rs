//! Answer generator trait.

use async_trait::async_trait;

use crate::error::LexisResult;

/// Produces a natural-language answer from an assembled prompt.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> LexisResult<String>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}
