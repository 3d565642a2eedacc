//! Configuration system for lexis.

use serde::{Deserialize, Serialize};

use crate::error::{LexisError, LexisResult};
use crate::generation::ContextAssembler;
use crate::intent::IntentConfig;
use crate::retrieval::RetrievalConfig;
use crate::rewrite::RewriterConfig;
use crate::traits::{
    EmbedderConfig, EmbedderProvider, IndexConfig, IndexProvider, RerankerConfig,
};

/// Main engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexisConfig {
    /// Embedder configuration.
    pub embedder: EmbedderConfig,
    /// Corpus index configuration.
    pub index: IndexConfig,
    /// Reranker configuration (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranker: Option<RerankerConfig>,
    /// Intent classification weights.
    pub intent: IntentConfig,
    /// Retrieval strategies and fusion.
    pub retrieval: RetrievalConfig,
    /// Query rewriting.
    pub rewriter: RewriterConfig,
    /// Context budget for answer generation.
    pub context: ContextAssembler,
}

impl LexisConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> LexisResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| LexisError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| LexisError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| LexisError::Configuration(e.to_string())),
            _ => Err(LexisError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from `LEXIS_*` style variables resolved by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Embedder
        if let Some(provider) = lookup("LEXIS_EMBEDDER_PROVIDER") {
            config.embedder.provider = match provider.to_lowercase().as_str() {
                "ollama" => EmbedderProvider::Ollama,
                _ => EmbedderProvider::OpenAI,
            };
        }
        if let Some(model) = lookup("LEXIS_EMBEDDER_MODEL") {
            config.embedder.model = model;
        }
        if let Some(url) = lookup("LEXIS_EMBEDDER_URL") {
            config.embedder.base_url = Some(url);
        }
        if let Some(dims) = lookup("LEXIS_EMBEDDING_DIMS").and_then(|d| d.parse().ok()) {
            config.embedder.embedding_dims = dims;
            config.index.embedding_dims = dims;
        }
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            config.embedder.api_key = Some(api_key);
        }

        // Index
        if let Some(provider) = lookup("LEXIS_INDEX_PROVIDER") {
            config.index.provider = match provider.to_lowercase().as_str() {
                "milvus" => IndexProvider::Milvus,
                _ => IndexProvider::Memory,
            };
        }
        if let Some(url) = lookup("LEXIS_INDEX_URL") {
            config.index.url = Some(url);
        }
        if let Some(token) = lookup("LEXIS_INDEX_TOKEN") {
            config.index.token = Some(token);
        }
        if let Some(collection) = lookup("LEXIS_COLLECTION") {
            config.index.collection_name = collection;
        }
        if let Some(path) = lookup("LEXIS_CORPUS_PATH") {
            config.index.corpus_path = Some(path);
        }

        // Reranker, enabled by either variable
        let rerank_model = lookup("LEXIS_RERANKER_MODEL");
        let rerank_key = lookup("COHERE_API_KEY");
        if rerank_model.is_some() || rerank_key.is_some() {
            let mut reranker = RerankerConfig::default();
            if let Some(model) = rerank_model {
                reranker.model = model;
            }
            reranker.api_key = rerank_key;
            reranker.base_url = lookup("LEXIS_RERANKER_URL");
            config.reranker = Some(reranker);
        }

        // Retrieval
        if let Some(ms) = lookup("LEXIS_STRATEGY_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.retrieval.strategy_timeout_ms = ms;
        }
        if let Some(enabled) = lookup("LEXIS_REWRITE_ENABLED") {
            config.retrieval.rewrite.enabled = matches!(enabled.as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Check every section.
    pub fn validate(&self) -> LexisResult<()> {
        self.intent
            .validate()
            .and_then(|_| self.retrieval.validate())
            .map_err(|e| LexisError::Configuration(e.to_string()))?;
        if self.rewriter.max_rewrites == 0 {
            return Err(LexisError::Configuration(
                "rewriter.max_rewrites must be at least 1".to_string(),
            ));
        }
        if self.index.embedding_dims != self.embedder.embedding_dims {
            return Err(LexisError::Configuration(format!(
                "index dimensions ({}) differ from embedder dimensions ({})",
                self.index.embedding_dims, self.embedder.embedding_dims
            )));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> LexisConfigBuilder {
        LexisConfigBuilder::default()
    }
}

/// Builder for LexisConfig.
#[derive(Default)]
pub struct LexisConfigBuilder {
    config: LexisConfig,
}

impl LexisConfigBuilder {
    /// Set embedder configuration.
    pub fn embedder(mut self, config: EmbedderConfig) -> Self {
        self.config.embedder = config;
        self
    }

    /// Set index configuration.
    pub fn index(mut self, config: IndexConfig) -> Self {
        self.config.index = config;
        self
    }

    /// Set reranker configuration.
    pub fn reranker(mut self, config: RerankerConfig) -> Self {
        self.config.reranker = Some(config);
        self
    }

    /// Set intent classification configuration.
    pub fn intent(mut self, config: IntentConfig) -> Self {
        self.config.intent = config;
        self
    }

    /// Set retrieval configuration.
    pub fn retrieval(mut self, config: RetrievalConfig) -> Self {
        self.config.retrieval = config;
        self
    }

    /// Set rewriter configuration.
    pub fn rewriter(mut self, config: RewriterConfig) -> Self {
        self.config.rewriter = config;
        self
    }

    /// Set generation context budget.
    pub fn context(mut self, config: ContextAssembler) -> Self {
        self.config.context = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> LexisConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StrategyKind;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = LexisConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.reranker.is_none());
        assert_eq!(config.index.collection_name, "vocabulary");
    }

    #[test]
    fn test_from_toml_file() {
        let file = write_temp(
            ".toml",
            r#"
[index]
provider = "milvus"
url = "http://localhost:19530"

[retrieval]
rrf_k = 30.0

[[retrieval.strategies]]
kind = "semantic"
weight = 0.7
top_k = 6

[[retrieval.strategies]]
kind = "exact_match"
weight = 0.3
top_k = 4
"#,
        );
        let config = LexisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.index.provider, IndexProvider::Milvus);
        assert_eq!(config.retrieval.rrf_k, 30.0);
        assert_eq!(config.retrieval.strategies.len(), 2);
        assert_eq!(config.retrieval.strategies[1].kind, StrategyKind::ExactMatch);
        assert_eq!(config.retrieval.strategy_timeout_ms, 5000);
    }

    #[test]
    fn test_from_json_and_yaml_files() {
        let json = write_temp(".json", r#"{"rewriter": {"max_rewrites": 4}}"#);
        assert_eq!(LexisConfig::from_file(json.path()).unwrap().rewriter.max_rewrites, 4);

        let yaml = write_temp(".yaml", "intent:\n  fast_path_threshold: 0.9\n");
        let config = LexisConfig::from_file(yaml.path()).unwrap();
        assert!((config.intent.fast_path_threshold - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".ini", "x=1");
        let err = LexisConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, LexisError::Configuration(_)));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("LEXIS_EMBEDDER_PROVIDER", "ollama"),
            ("LEXIS_EMBEDDING_DIMS", "768"),
            ("LEXIS_INDEX_PROVIDER", "milvus"),
            ("COHERE_API_KEY", "k"),
            ("LEXIS_REWRITE_ENABLED", "true"),
        ]
        .into_iter()
        .collect();
        let config = LexisConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.embedder.provider, EmbedderProvider::Ollama);
        assert_eq!(config.embedder.embedding_dims, 768);
        assert_eq!(config.index.embedding_dims, 768);
        assert_eq!(config.index.provider, IndexProvider::Milvus);
        assert_eq!(
            config.reranker.as_ref().and_then(|r| r.api_key.as_deref()),
            Some("k")
        );
        assert!(config.retrieval.rewrite.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dimension_mismatch() {
        let mut index = IndexConfig::default();
        index.embedding_dims = 512;
        let config = LexisConfig::builder().index(index).build();
        assert!(config.validate().is_err());
    }
}
