//! Company Scout API Server
//!
//! HTTP API server that researches a company on demand and returns a
//! structured report.

mod config;
mod routes;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use scout_research::{
    EmbeddingClient, OpenAIClient, PipelineSettings, ResearchAgent, TavilyClient,
    WebDocumentLoader,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<ResearchAgent>,
    /// Where each successful report is written; `None` disables it
    pub snapshot_path: Option<PathBuf>,
    /// Fires on shutdown so in-flight research stops
    pub shutdown: CancellationToken,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,scout_api=debug")),
        )
        .init();

    info!("Starting Company Scout API");

    let config = AppConfig::from_env()?;
    info!("Configuration loaded: {:?}", config);

    let agent = build_agent(&config)?;
    let shutdown = CancellationToken::new();

    let state = AppState {
        agent: Arc::new(agent),
        snapshot_path: config.snapshot_path.clone(),
        shutdown: shutdown.clone(),
    };

    let app = routes::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wire the production providers into a research agent
fn build_agent(config: &AppConfig) -> anyhow::Result<ResearchAgent> {
    let search = TavilyClient::new(config.tavily_api_key.clone())?;
    let loader = WebDocumentLoader::new()?;

    let embedder = EmbeddingClient::new(config.openai_api_key.clone())
        .with_model(&config.embedding_model, config.embedding_dimension);

    let llm = match &config.llm_api_base {
        Some(base) => {
            info!("Using LLM endpoint {}", base);
            OpenAIClient::new(config.openai_api_key.clone())
                .with_api_base(config.openai_api_key.clone(), base)
        }
        None => OpenAIClient::new(config.openai_api_key.clone()),
    }
    .with_model(&config.llm_model);

    let settings = PipelineSettings {
        call_timeout: config.call_timeout,
        ..PipelineSettings::default()
    };

    Ok(ResearchAgent::new(
        Arc::new(search),
        Arc::new(loader),
        Arc::new(embedder),
        Arc::new(llm),
    )
    .with_settings(settings))
}

/// Resolve on Ctrl+C and cancel in-flight research
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}
