//! Fintrack API Server
//!
//! Run with: cargo run --bin fintrack
//!
//! # Configuration
//!
//! Read from `FINTRACK_CONFIG` when set, otherwise from the default search
//! path (see `Config::load_default`). `FINTRACK_*` variables override
//! individual settings; `RUST_LOG` overrides the log filter.

use anyhow::Context;
use fintrack::api::{serve, AppState};
use fintrack::config::Config;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("FINTRACK_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            Config::load_with_env(&path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        Err(_) => Config::load_default(),
    };

    config.logging.init();

    tracing::info!("Starting Fintrack API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_path());

    let state = AppState::open(config).context("opening finance store")?;

    // Months that closed while the server was down
    match state.ledger.ensure_rollover_processing().await {
        Ok(report) if report.months_processed > 0 => tracing::info!(
            from = ?report.from,
            through = %report.through,
            months = report.months_processed,
            "Rollover catch-up complete"
        ),
        Ok(_) => tracing::debug!("Rollovers up to date"),
        Err(e) => tracing::error!(error = %e, "Rollover catch-up failed; will retry on next dashboard load"),
    }

    if let Err(e) = state.ledger.ensure_current_month_snapshot() {
        tracing::warn!(error = %e, "Could not record net worth snapshot");
    }

    match &state.remote {
        Some(remote) => {
            match remote.health_check().await {
                Ok(()) => tracing::info!("Remote reachable: {}", remote.config().url),
                Err(e) => tracing::warn!("Remote not available: {} (actions stay queued)", e),
            }

            if !state.queue.is_empty() {
                let queue = state.queue.clone();
                let remote = remote.clone();
                tokio::spawn(async move {
                    let summary = queue.flush(remote.as_ref()).await;
                    tracing::info!(
                        processed = summary.processed,
                        remaining = summary.remaining,
                        "Startup queue flush finished"
                    );
                });
            }
        }
        None => tracing::info!("Remote disabled (set FINTRACK_REMOTE_URL and FINTRACK_REMOTE_KEY to enable)"),
    }

    serve(state).await?;

    tracing::info!("Fintrack API server stopped");
    Ok(())
}
