use anyhow::{Context, Result};
use clap::Parser;
use song_catalog::metadata::{ExtraDataApiProvider, ProviderConfig};
use song_catalog::server;
use song_catalog::storage::SqliteSongStore;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "song-catalog")]
#[command(about = "Song Catalog Server", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "SERVER_ADDRESS", default_value = "0.0.0.0:8080")]
    address: String,

    /// SQLite database URL
    #[arg(short, long, env = "DB_CONNECTION_STRING", default_value = "sqlite:songs.db")]
    database: String,

    /// Base address of the extra data API (`/info` is appended)
    #[arg(short, long, env = "EXTRA_DATA_API_ADDRESS")]
    extra_data_api: String,

    /// Extra data API request timeout, in seconds
    #[arg(long, default_value = "10")]
    extra_data_timeout: u64,

    /// Log level or filter directives, e.g. `debug` or `song_catalog=debug,tower_http=info`
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("Failed to parse log level '{}'", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting Song Catalog with log level '{}'", cli.log_level);

    let store = SqliteSongStore::connect(&cli.database)
        .await
        .with_context(|| format!("Failed to connect to database {}", cli.database))?;
    store
        .ensure_schema()
        .await
        .context("Failed to create database schema")?;

    let provider = ExtraDataApiProvider::new(
        ProviderConfig::new(&cli.extra_data_api)
            .with_timeout(Duration::from_secs(cli.extra_data_timeout)),
    )
    .context("Failed to create extra data API client")?;

    let app = server::create_router(Arc::new(store), Arc::new(provider));

    let listener = tokio::net::TcpListener::bind(&cli.address)
        .await
        .context("Failed to bind to address")?;

    tracing::info!("Server listening on http://{}", cli.address);
    tracing::info!("API endpoints:");
    tracing::info!("  POST     /song    - Create a song");
    tracing::info!("  PUT      /song    - Update a song");
    tracing::info!("  DELETE   /song    - Delete a song");
    tracing::info!("  GET|POST /songs   - List songs (filter, offset, limit)");
    tracing::info!("  GET|POST /lyrics  - Get a couplet (song_id, couplet_num)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
