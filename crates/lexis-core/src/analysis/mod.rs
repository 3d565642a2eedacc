//! Query analysis: tokenization, key terms, query type and issue detection.

mod analyzer;
pub mod lexicon;
mod tokenizer;

pub use analyzer::QueryAnalyzer;
pub use tokenizer::{tokenize, Token, TokenKind};
