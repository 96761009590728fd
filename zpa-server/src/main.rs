//! zpa-server - ZIP penetration HTTP API
//!
//! Loads the snapshot (building it from the CSV on first start), then serves
//! the dataset until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use zpa_common::config::ZpaConfig;
use zpa_server::bootstrap::load_dataset;
use zpa_server::stats::compute_stats;
use zpa_server::{build_router, AppState};

/// Command-line arguments for zpa-server
#[derive(Parser, Debug)]
#[command(name = "zpa-server")]
#[command(about = "ZIP code market penetration API")]
#[command(version)]
struct Args {
    /// Config file (overrides ZPA_CONFIG and ./zpa.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and ZPA_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = ZpaConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting zpa-server v{}", env!("CARGO_PKG_VERSION"));

    let records = load_dataset(&config)
        .await
        .context("Failed to initialize dataset")?;

    info!("Dataset loaded with {} ZIP codes", records.len());
    if let Some(stats) = compute_stats(&records) {
        if let Some(overall) = stats.overall_market_penetration {
            info!("Overall market penetration: {}%", overall);
        }
        info!("Average market penetration: {}%", stats.average_market_penetration);
    }

    let mut state = AppState::new(records, config.auth.password.as_deref());
    if state.login.is_enabled() {
        info!("Login enabled");
    } else {
        warn!("No login password configured; every login attempt will be rejected");
    }
    if config.static_assets.is_dir() {
        info!("Serving static assets from {}", config.static_assets.display());
        state = state.with_static_assets(&config.static_assets);
    } else {
        warn!(
            "Static assets directory {} not found; dashboard disabled",
            config.static_assets.display()
        );
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!("Failed to bind to {}:{}", config.server.host, config.server.port)
        })?;
    let addr: SocketAddr = listener.local_addr().context("Failed to read listen address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
