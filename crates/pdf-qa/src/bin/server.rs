//! PDF Q&A server binary
//!
//! Run with: cargo run -p pdf-qa --bin pdf-qa-server -- --config pdf-qa.toml

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pdf_qa::{
    config::{AppConfig, Secrets},
    providers,
    server::PdfQaServer,
    SessionManager,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pdf-qa-server", version, about = "Ask questions about an uploaded PDF")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "PDF_QA_CONFIG")]
    config: Option<PathBuf>,

    /// Override server.host
    #[arg(long)]
    host: Option<String>,

    /// Override server.port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_qa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    let secrets = Secrets::from_env(&config).context("reading secrets")?;

    tracing::info!("Configuration loaded");
    tracing::info!(
        "  - Embedding model: {} ({} dims)",
        config.embeddings.model,
        config.embeddings.dimensions
    );
    tracing::info!("  - LLM: {:?} / {}", config.llm.provider, config.llm.model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.max_chars,
        config.chunking.overlap_chars
    );

    let embedder = providers::build_embedder(&config)?;
    let llm = providers::build_llm(&config, &secrets)?;

    if !embedder.health_check().await.unwrap_or(false) {
        tracing::warn!(
            "Embedding service not reachable at {}; uploads will fail until it is",
            config.embeddings.base_url
        );
        tracing::warn!("  Start it with: ollama serve && ollama pull {}", config.embeddings.model);
    }
    if !llm.health_check().await.unwrap_or(false) {
        tracing::warn!("Language model {} not reachable; questions will fail until it is", llm.name());
    }

    let manager = SessionManager::from_config(&config, embedder, llm)?;
    let server = PdfQaServer::new(config, manager);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
