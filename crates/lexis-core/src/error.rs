//! Error types for lexis operations.
//!
//! Every failure carries an [`ErrorCode`] for programmatic handling and, where
//! one exists, a suggestion for resolving it.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for lexis operations.
pub type LexisResult<T> = Result<T, LexisError>;

/// Main error type for all lexis operations.
#[derive(Error, Debug)]
pub enum LexisError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// The query had no usable content.
    #[error("Empty query")]
    EmptyQuery,

    /// A single retrieval strategy failed.
    #[error("Strategy '{strategy}' failed: {message}")]
    StrategyFailure { strategy: String, message: String },

    /// A single retrieval strategy exceeded its time budget.
    #[error("Strategy '{strategy}' timed out after {timeout_ms}ms")]
    StrategyTimeout { strategy: String, timeout_ms: u64 },

    /// Every strategy failed, so the index could not be consulted at all.
    #[error("Index unavailable: {message}")]
    IndexUnavailable { message: String, code: ErrorCode },

    /// Vector index operation failed.
    #[error("Vector store error: {message}")]
    VectorStore {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Embedding generation failed.
    #[error("Embedding error: {message}")]
    Embedding {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cross-encoder reranking failed.
    #[error("Reranker error: {message}")]
    Reranker { message: String, code: ErrorCode },

    /// Answer generation failed.
    #[error("Generation error: {message}")]
    Generation { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Provider not supported.
    #[error("Provider not supported: {provider}")]
    UnsupportedProvider { provider: String },

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// The caller cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValInvalidFilter,

    // Query (QRY_xxx)
    QryEmpty,
    QryStrategyFailed,
    QryStrategyTimeout,
    QryCancelled,

    // Index (IDX_xxx / VEC_xxx)
    IdxUnavailable,
    VecConnectionFailed,
    VecOperationFailed,
    VecCollectionNotFound,

    // Embedding (EMB_xxx)
    EmbConnectionFailed,
    EmbGenerationFailed,

    // Reranker (RRK_xxx)
    RrkFailed,
    RrkInvalidResponse,

    // Generation (GEN_xxx)
    GenFailed,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,

    // Configuration (CFG_xxx)
    CfgInvalid,
    CfgUnsupportedProvider,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseMissingField,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValInvalidFilter => "VAL_002",
            ErrorCode::QryEmpty => "QRY_001",
            ErrorCode::QryStrategyFailed => "QRY_002",
            ErrorCode::QryStrategyTimeout => "QRY_003",
            ErrorCode::QryCancelled => "QRY_004",
            ErrorCode::IdxUnavailable => "IDX_001",
            ErrorCode::VecConnectionFailed => "VEC_001",
            ErrorCode::VecOperationFailed => "VEC_002",
            ErrorCode::VecCollectionNotFound => "VEC_003",
            ErrorCode::EmbConnectionFailed => "EMB_001",
            ErrorCode::EmbGenerationFailed => "EMB_002",
            ErrorCode::RrkFailed => "RRK_001",
            ErrorCode::RrkInvalidResponse => "RRK_002",
            ErrorCode::GenFailed => "GEN_001",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::CfgInvalid => "CFG_001",
            ErrorCode::CfgUnsupportedProvider => "CFG_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseMissingField => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl LexisError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a strategy failure.
    pub fn strategy(strategy: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StrategyFailure {
            strategy: strategy.into(),
            message: message.into(),
        }
    }

    /// Create an index-unavailable error.
    pub fn index_unavailable(message: impl Into<String>) -> Self {
        Self::IndexUnavailable {
            message: message.into(),
            code: ErrorCode::IdxUnavailable,
        }
    }

    /// Create a vector store error.
    pub fn vector_store(message: impl Into<String>) -> Self {
        Self::VectorStore {
            message: message.into(),
            code: ErrorCode::VecOperationFailed,
            source: None,
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
            code: ErrorCode::EmbGenerationFailed,
            source: None,
        }
    }

    /// Create a reranker error.
    pub fn reranker(message: impl Into<String>) -> Self {
        Self::Reranker {
            message: message.into(),
            code: ErrorCode::RrkFailed,
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            code: ErrorCode::GenFailed,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::EmptyQuery => ErrorCode::QryEmpty,
            Self::StrategyFailure { .. } => ErrorCode::QryStrategyFailed,
            Self::StrategyTimeout { .. } => ErrorCode::QryStrategyTimeout,
            Self::IndexUnavailable { code, .. } => *code,
            Self::VectorStore { code, .. } => *code,
            Self::Embedding { code, .. } => *code,
            Self::Reranker { code, .. } => *code,
            Self::Generation { code, .. } => *code,
            Self::Configuration(_) => ErrorCode::CfgInvalid,
            Self::Network { code, .. } => *code,
            Self::UnsupportedProvider { .. } => ErrorCode::CfgUnsupportedProvider,
            Self::Parse { code, .. } => *code,
            Self::Cancelled => ErrorCode::QryCancelled,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::EmptyQuery => Some("Please enter a word or a question about a word"),
            Self::IndexUnavailable { .. } => {
                Some("Please check that the corpus index is running and populated")
            }
            Self::VectorStore { .. } => Some("Please check your vector store connection settings"),
            Self::Embedding { .. } => Some("Please check your embedding provider configuration"),
            Self::Reranker { .. } => Some("Please check your reranker provider configuration"),
            Self::UnsupportedProvider { .. } => {
                Some("Please enable the crate feature for this provider")
            }
            _ => None,
        }
    }

    /// Whether the error leaves retrieval with nothing to return rather than
    /// signalling a caller mistake.
    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::IndexUnavailable { .. })
    }
}
