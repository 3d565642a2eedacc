//! lexis - query the vocabulary corpus from the command line.
//!
//! # Configuration
//!
//! Pass `--config lexis.toml` (TOML, JSON or YAML), or set environment
//! variables (a `.env` file is honoured):
//!
//! - `LEXIS_INDEX_PROVIDER` - `memory` (default) or `milvus`
//! - `LEXIS_CORPUS_PATH` - JSON Lines corpus for the memory index
//! - `LEXIS_INDEX_URL` - Milvus server URL
//! - `LEXIS_EMBEDDER_PROVIDER` - `openai` (default) or `ollama`
//! - `OPENAI_API_KEY` - Required for OpenAI embeddings
//! - `RUST_LOG` - Log filter, logs go to stderr

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::{run_cli, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // stdout carries the JSON output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())))
        .init();

    run_cli(cli).await
}
