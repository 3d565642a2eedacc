//! lexis-vector-stores - Corpus index implementations for lexis.
//!
//! # Supported Backends
//!
//! - **Memory** (always available) - JSON Lines corpus held in memory,
//!   cosine similarity search and filter evaluation
//! - **Milvus** (feature: `milvus`) - Milvus REST API v2

mod factory;
mod memory;

#[cfg(feature = "milvus")]
mod milvus;

// Public exports
pub use factory::IndexFactory;
pub use memory::{chunk_id, CorpusRecord, MemoryIndex};

#[cfg(feature = "milvus")]
pub use milvus::{filter_expression, MilvusIndex};
