//! Core traits for lexis providers.

mod embedder;
mod generator;
mod reranker;
mod vector_index;

pub use embedder::*;
pub use generator::*;
pub use reranker::*;
pub use vector_index::*;
