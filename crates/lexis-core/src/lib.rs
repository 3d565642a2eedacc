//! lexis-core - Core library for lexis.
//!
//! Answers free-form vocabulary questions ("sensible的同义词有哪些",
//! "give an example sentence for ephemeral") by classifying intent, running
//! several retrieval strategies against a chunk index and fusing their
//! results into one ranked list.
//!
//! # Example
//!
//! ```ignore
//! use lexis_core::{LexisConfig, QueryEngine};
//!
//! let engine = QueryEngine::new(LexisConfig::default(), index, embedder)?;
//!
//! let intent = engine.classify_intent("什么是 sensible");
//! let candidates = engine.retrieve("sensible的同义词有哪些", 5).await;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod generation;
pub mod intent;
pub mod rerank;
pub mod retrieval;
pub mod rewrite;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use analysis::QueryAnalyzer;
pub use config::LexisConfig;
pub use error::{LexisError, LexisResult};
pub use intent::{IntentClassifier, IntentConfig};
pub use retrieval::{Answer, MultiStrategyRetriever, QueryEngine, RetrievalConfig};
pub use rewrite::{QueryRewriter, RewriterConfig};
pub use traits::{
    Embedder, EmbedderConfig, Generator, IndexConfig, IndexHit, Reranker, RerankerConfig,
    VectorIndex,
};
pub use types::{
    Candidate, ChunkType, Filter, Intent, IntentResult, QueryProfile, RankedCandidate,
    RewriteOutcome, RewriteStrategy, StrategyKind, StrategyResult,
};
