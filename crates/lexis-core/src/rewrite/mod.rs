//! Query rewriting: alternative phrasings of a query, scored by how many key
//! terms they keep.

mod restructure;
mod rewriter;
mod templates;

pub use rewriter::{select_strategy, QueryRewriter, RewriterConfig};
