//! fusion-rag command line
//!
//! Run with: cargo run -p fusion-rag --features cli -- --file notes.pdf ask "What is RRF?"

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fusion_rag::{
    AnswerOptions, AnswerOutcome, DocumentContent, FuseOptions, RagConfig, RagPipeline,
};

/// Ingest documents and query them with fused multi-query retrieval
#[derive(Parser, Debug)]
#[command(name = "fusion-rag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Document to ingest before running the command (repeatable)
    #[arg(short, long = "file", global = true)]
    files: Vec<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Plain top-k search
    Search {
        query: String,

        /// Number of chunks to return
        #[arg(short)]
        k: Option<usize>,
    },
    /// Multi-query retrieval with rank fusion
    Fuse {
        query: String,

        /// Number of document chunks to return
        #[arg(short)]
        k: Option<usize>,

        /// Queries to fuse, original included
        #[arg(long)]
        num_queries: Option<usize>,

        /// Append web search snippets
        #[arg(long)]
        web: bool,
    },
    /// Answer a question from retrieved context
    Ask {
        question: String,

        /// Number of chunks to retrieve
        #[arg(short)]
        k: Option<usize>,

        /// Retrieve with rank fusion instead of plain search
        #[arg(long)]
        fuse: bool,

        /// Include web snippets (implies --fuse)
        #[arg(long)]
        web: bool,
    },
    /// Show what was ingested
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fusion_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = RagConfig::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.openai.embedding_model);
    tracing::info!("  - Answer model: {}", config.openai.answer_model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    let pipeline = RagPipeline::from_config(config).context("building pipeline")?;
    ingest_files(&pipeline, &cli.files).await?;

    let fuse_defaults = FuseOptions::from_config(&pipeline.config().retrieval);
    let default_k = pipeline.config().retrieval.default_k;

    match cli.command {
        Commands::Search { query, k } => {
            let chunks = pipeline.search(&query, k.unwrap_or(default_k)).await?;
            print_chunks(&chunks, cli.json)?;
        }
        Commands::Fuse {
            query,
            k,
            num_queries,
            web,
        } => {
            let mut options = fuse_defaults.with_k(k.unwrap_or(default_k)).with_web(web);
            if let Some(n) = num_queries {
                options.num_queries = n;
            }
            let chunks = pipeline.fuse(&query, &options).await?;
            print_chunks(&chunks, cli.json)?;
        }
        Commands::Ask { question, k, fuse, web } => {
            let k = k.unwrap_or(default_k);
            let options = if fuse || web {
                AnswerOptions::fuse(fuse_defaults.with_k(k).with_web(web))
            } else {
                AnswerOptions::search(k)
            };

            let outcome = pipeline.answer(&question, &options).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                match outcome {
                    AnswerOutcome::Answered { answer, context } => {
                        println!("{}\n", answer);
                        println!("({} context chunks)", context.len());
                    }
                    AnswerOutcome::NoRelevantContent => {
                        println!("No relevant content found in the ingested documents.");
                    }
                }
            }
        }
        Commands::Stats => {
            let stats = pipeline.stats();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Documents: {}", stats.document_count);
                println!("Chunks:    {}", stats.total_chunks);
                println!("Vectors:   {}", stats.vector_count);
                for id in &stats.documents {
                    println!("  - {}", id);
                }
            }
        }
    }

    Ok(())
}

async fn ingest_files(pipeline: &RagPipeline, files: &[PathBuf]) -> anyhow::Result<()> {
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        documents.push((id, DocumentContent::Bytes(bytes)));
    }

    for (id, result) in pipeline.ingest_many(documents).await {
        match result {
            Ok(report) => eprintln!(
                "Ingested {}: {} chunks, {} characters",
                id, report.chunks_created, report.total_characters
            ),
            Err(e) => eprintln!("Skipped {}: {}", id, e),
        }
    }
    Ok(())
}

fn print_chunks(chunks: &[String], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(chunks)?);
        return Ok(());
    }
    if chunks.is_empty() {
        println!("No results.");
    }
    for (i, chunk) in chunks.iter().enumerate() {
        println!("[{}] {}\n", i + 1, chunk);
    }
    Ok(())
}
