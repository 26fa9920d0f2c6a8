// Main entry point for the help desk API server

use std::sync::Arc;

use anyhow::{Context, Result};
use helpdesk::{ai::OpenAI, HelpDesk, KnowledgeLoader, DEFAULT_CATEGORY};
use helpdesk_server::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helpdesk=debug,helpdesk_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Intelligent Help Desk System");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    // Load knowledge base
    let loaded = KnowledgeLoader::new(&config.data_dir)
        .load()
        .context("Failed to load knowledge base")?;
    let categories = loaded
        .category_set(DEFAULT_CATEGORY)
        .context("Invalid category definitions")?;
    tracing::info!(
        categories = categories.len(),
        chunks = loaded.chunks.len(),
        "Knowledge base loaded"
    );

    // Connect AI provider
    let mut ai = OpenAI::new(config.openai_api_key)
        .with_model(config.openai_model)
        .with_embedding_model(config.embedding_model);
    if let Some(base_url) = config.openai_base_url {
        ai = ai.with_base_url(base_url);
    }
    tracing::info!(model = %ai.model(), embedding_model = %ai.embedding_model(), "AI provider configured");

    // Build index (embeds every chunk)
    tracing::info!("Embedding knowledge base...");
    let desk = HelpDesk::with_config(ai, categories, loaded.chunks, config.pipeline)
        .await
        .context("Failed to build knowledge index")?;
    tracing::info!("Help desk ready");

    let app = build_app(Arc::new(desk));

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down Help Desk System");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
