use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quillboard::config::{Cli, Config};
use quillboard::routes;
use quillboard::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Create the store document up front so a bad path fails at boot
    let state = AppState::from_config(config.clone());
    state.store.ensure_seeded().await?;
    tracing::info!(
        "Store: {} ({:?} preset)",
        config.store_path().display(),
        config.store.preset
    );

    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
