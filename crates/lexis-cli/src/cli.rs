//! Command-line interface definition and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use lexis_core::rerank::{rerank_candidates, RerankedDocument};
use lexis_core::traits::{Embedder, IndexProvider, VectorIndex};
use lexis_core::types::RankedCandidate;
use lexis_core::{ChunkType, IntentClassifier, LexisConfig, QueryEngine, QueryRewriter, RewriteStrategy};
use lexis_embeddings::EmbedderFactory;
use lexis_rerankers::RerankerFactory;
use lexis_vector_stores::{IndexFactory, MemoryIndex};

#[derive(Parser, Debug)]
#[command(name = "lexis")]
#[command(about = "Intent-aware retrieval over an English vocabulary corpus")]
#[command(version)]
pub struct Cli {
    /// Configuration file (.toml, .json, .yaml). Defaults to LEXIS_* variables.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "lexis_core=debug,lexis_cli=debug,info"
        } else {
            "warn"
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify the intent and target term of a query
    Intent {
        /// Learner query
        query: String,
    },

    /// Generate rewritten variants of a query
    Rewrite {
        /// Learner query
        query: String,

        /// Rewrite strategy (expand, simplify, paraphrase, clarify,
        /// multi_perspective, restructure, synonym_swap, comprehensive)
        #[arg(short, long)]
        strategy: Option<RewriteStrategy>,
    },

    /// Retrieve ranked corpus chunks for a query
    Retrieve {
        /// Learner query
        query: String,

        /// Number of results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Rerank the results with the configured cross-encoder
        #[arg(short, long)]
        rerank: bool,
    },

    /// Look up corpus chunks by headword
    Lookup {
        /// Headword (substring match)
        word: String,

        /// Restrict to one chunk type (definition, examples, phrases,
        /// semantic_network)
        #[arg(short = 't', long)]
        chunk_type: Option<ChunkType>,

        /// Maximum number of chunks
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Serialize)]
struct RetrieveOutput {
    candidates: Vec<RankedCandidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reranked: Vec<RerankedDocument>,
}

pub async fn run_cli(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Intent { query } => {
            let classifier = IntentClassifier::new(config.intent.clone());
            print_json(&classifier.classify(&query))
        }

        Commands::Rewrite { query, strategy } => {
            let rewriter = QueryRewriter::new(config.rewriter.clone());
            print_json(&rewriter.rewrite(&query, strategy))
        }

        Commands::Retrieve {
            query,
            top_k,
            rerank,
        } => {
            let reranker_config = match (rerank, &config.reranker) {
                (true, Some(reranker_config)) => Some(reranker_config.clone()),
                (true, None) => bail!("--rerank needs a [reranker] section in the configuration"),
                (false, _) => None,
            };

            let engine = build_engine(config).await?;
            let candidates = engine.try_retrieve(&query, top_k).await.or_else(|e| {
                if e.is_no_results() {
                    info!(error = %e, "No results");
                    Ok(Vec::new())
                } else {
                    Err(e)
                }
            })?;

            let reranked = match reranker_config {
                Some(reranker_config) => {
                    let reranker = RerankerFactory::create(reranker_config.clone())?;
                    rerank_candidates(
                        reranker.as_ref(),
                        &reranker_config.instruction,
                        &query,
                        &candidates,
                        reranker_config.top_n,
                    )
                    .await?
                }
                None => Vec::new(),
            };

            print_json(&RetrieveOutput {
                candidates,
                reranked,
            })
        }

        Commands::Lookup {
            word,
            chunk_type,
            limit,
        } => {
            let engine = build_engine(config).await?;
            print_json(&engine.lookup(&word, chunk_type, limit).await?)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<LexisConfig> {
    let config = match path {
        Some(path) => LexisConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => LexisConfig::from_env(),
    };
    config.validate()?;
    Ok(config)
}

async fn build_engine(config: LexisConfig) -> Result<QueryEngine> {
    let embedder = EmbedderFactory::create(config.embedder.clone())?;
    let index = open_index(&config, embedder.as_ref()).await?;
    Ok(QueryEngine::new(config, index, embedder)?)
}

/// The memory index is embedded on load when its corpus lacks vectors.
async fn open_index(config: &LexisConfig, embedder: &dyn Embedder) -> Result<Arc<dyn VectorIndex>> {
    if config.index.provider != IndexProvider::Memory {
        return Ok(IndexFactory::create(&config.index).await?);
    }

    let path = config
        .index
        .corpus_path
        .as_deref()
        .context("the memory index needs index.corpus_path or LEXIS_CORPUS_PATH")?;
    let mut index = MemoryIndex::from_jsonl(path, config.index.collection_name.clone()).await?;
    let embedded = index.embed_missing(embedder).await?;
    if embedded > 0 {
        info!(embedded, model = embedder.model_name(), "Embedded corpus records");
    }
    Ok(Arc::new(index))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
