//! nostream-exporter - Prometheus exporter for nostream relay statistics.
//!
//! Reads relay statistics from the relay's PostgreSQL database on every
//! scrape and serves them on `/metrics`.

mod collector;
mod config;
mod db;
mod error;
mod http;
mod metrics;
mod telemetry;

use crate::collector::RelayCollector;
use crate::config::Config;
use crate::db::Database;
use crate::http::AppState;
use crate::metrics::ExporterMetrics;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Optional collector tuning file
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!(error = %e, "Failed to load config");
        e
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.listen.address(),
        tracked_kinds = ?config.collector.tracked_kinds,
        user_stats = config.collector.user_stats,
        "Starting nostream-exporter"
    );

    let metrics = ExporterMetrics::new()?;
    let db = Database::connect_lazy(&config.database);
    let collector = RelayCollector::new(Arc::new(db.clone()), config.collector.clone());

    let state = AppState {
        collector: Arc::new(collector),
        metrics,
    };

    let addr = config.listen.address();
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(%addr, error = %e, "Failed to bind HTTP server");
        e
    })?;

    http::run_http_server(listener, state, shutdown_signal()).await?;

    db.close().await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Signal received, starting graceful shutdown");
}
