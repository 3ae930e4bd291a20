// Energy Atlas - Web Server
// JSON API over the loaded datasets (feature "server")

use anyhow::{Context, Result};
use clap::Parser;
use energy_atlas::{server, DirectoryFetcher, EnergyStore, EngineConfig, LoadOutcome};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for atlas-server
#[derive(Parser, Debug)]
#[command(name = "atlas-server")]
#[command(about = "JSON API for the energy atlas datasets")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "ENERGY_ATLAS_PORT")]
    port: u16,

    /// Directory holding the JSON resources (overrides env and config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "energy_atlas=info,atlas_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = EngineConfig::resolve(args.data_dir.as_deref())
        .context("Failed to resolve configuration")?;
    info!("Data directory: {}", config.data_dir.display());

    let store = EnergyStore::from_config(&config);
    let fetcher = DirectoryFetcher::new(&config.data_dir);

    // Ingestion is blocking file I/O, keep it off the async workers
    let loader = store.clone();
    let outcome = tokio::task::spawn_blocking(move || loader.load(&fetcher))
        .await
        .context("Load task panicked")?
        .with_context(|| format!("Failed to load datasets from {}", config.data_dir.display()))?;

    if let LoadOutcome::Loaded { missing_optional } = &outcome {
        if !missing_optional.is_empty() {
            warn!(?missing_optional, "serving without optional sources");
        }
    }

    let app = server::router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("🚀 Server running on http://localhost:{}", args.port);
    info!("   API: http://localhost:{}/api/views/dependency", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
