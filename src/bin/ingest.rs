//! Offline FAQ ingestion: CSV -> chunks -> embeddings -> LanceDB index.
//!
//! Run before starting the server; the server only reads the index.

use std::fs::File;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use support_rag_chat::store::{Embedder, FaqStore, ingest_faq};

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Build the FAQ similarity index from a question/answer CSV")]
struct Cli {
    /// Path to the FAQ source file (header: question,answer)
    #[arg(long, default_value = "data/faq.csv")]
    csv: String,

    /// Path to the LanceDB database
    #[arg(long, default_value = "data/faq.lance")]
    db: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!(csv = %cli.csv, "reading FAQ source");
    let file = File::open(&cli.csv)?;

    let mut embedder = Embedder::new()?;
    let store = FaqStore::new(&cli.db, embedder.dimension()).await?;

    let written = ingest_faq(file, &store, &mut embedder).await?;
    info!(chunks = written, db = %cli.db, "FAQ index built");

    Ok(())
}
