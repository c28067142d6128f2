//! Web RAG command line
//!
//! Run with: cargo run -p web-rag --features cli -- --url https://www.uchicago.edu/ --question "..."

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_rag::{Error, RagConfig, RagPipeline, WebPageSource};

/// Ask questions about a set of web pages
#[derive(Debug, Parser)]
#[command(name = "web-rag", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page to ingest (repeatable; added to `source.urls` from the config)
    #[arg(short, long = "url")]
    urls: Vec<String>,

    /// Question to answer
    #[arg(short, long)]
    question: String,

    /// Number of chunks to retrieve (defaults to `retrieval.top_k`)
    #[arg(short)]
    k: Option<usize>,

    /// Print the retrieved chunks before the answer
    #[arg(long)]
    show_context: bool,

    /// Skip the Ollama availability check
    #[arg(long)]
    skip_health_check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "web_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RagConfig::from_file(path)?,
        None => RagConfig::default(),
    };
    config.source.urls.extend(args.urls.iter().cloned());

    if config.source.urls.is_empty() {
        anyhow::bail!("no pages to ingest: pass --url or set source.urls in the config");
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Pages: {}", config.source.urls.len());
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Chunk size: {} words", config.chunking.chunk_size);

    let source = WebPageSource::from_config(&config.source)?;
    let k = args.k.unwrap_or(config.retrieval.top_k);
    let base_url = config.llm.base_url.clone();
    let pipeline = RagPipeline::with_ollama(config)?;

    if !args.skip_health_check {
        pipeline
            .health_check()
            .await
            .with_context(|| format!("Ollama is not reachable at {}", base_url))?;
    }

    let index = pipeline.build_index_from_source(&source).await?;
    let results = match pipeline.retriever().retrieve(&args.question, &index, k).await {
        Ok(results) => results,
        Err(Error::EmptyIndex) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    if args.show_context {
        for result in &results {
            println!("URL: {}", result.source_id);
            println!("Text: {}", result.text);
            println!();
        }
    }

    let answer = pipeline.answer_from_results(&args.question, &results).await?;
    println!("{}", answer);
    Ok(())
}
