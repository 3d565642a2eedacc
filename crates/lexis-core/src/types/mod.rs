//! Core types for lexis.

mod candidate;
mod filter;
mod intent;
mod query;
mod rewrite;

pub use candidate::*;
pub use filter::*;
pub use intent::*;
pub use query::*;
pub use rewrite::*;
