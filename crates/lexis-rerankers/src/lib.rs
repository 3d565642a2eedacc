//! lexis-rerankers - Cross-encoder reranker implementations for lexis.
//!
//! # Supported Backends
//!
//! - **Cohere** (feature: `cohere`) - Cohere Rerank API, or any server
//!   exposing a compatible `/rerank` endpoint

mod factory;

#[cfg(feature = "cohere")]
mod cohere;

pub use factory::RerankerFactory;

#[cfg(feature = "cohere")]
pub use cohere::CohereReranker;

// Re-export core types
pub use lexis_core::traits::{RankedDocument, Reranker, RerankerConfig, RerankerProvider};
