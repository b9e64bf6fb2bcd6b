//! Fintrack REST API
//!
//! HTTP API layer for Fintrack, built with Axum.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /api/v1/dashboard` - Month summary (runs rollover catch-up first)
//!
//! ## Transactions
//! - `GET /api/v1/transactions` - List (`?month=YYYY-MM`)
//! - `POST /api/v1/transactions` - Create
//! - `DELETE /api/v1/transactions/:id` - Delete
//!
//! ## Budgets and rollovers
//! - `GET /api/v1/budgets` - List (`?month=YYYY-MM`)
//! - `PUT /api/v1/budgets` - Upsert
//! - `DELETE /api/v1/budgets/:id` - Delete
//! - `GET /api/v1/budgets/status` - Per-category status (`?month=YYYY-MM`)
//! - `GET /api/v1/rollovers` - List (`?month=YYYY-MM`)
//! - `POST /api/v1/rollovers/recompute` - Recompute from a month or catch up
//!
//! ## Goals
//! - `GET /api/v1/goals`, `POST /api/v1/goals`
//! - `POST /api/v1/goals/:id/progress`, `POST /api/v1/goals/:id/reset`
//! - `DELETE /api/v1/goals/:id`
//!
//! ## Net worth
//! - `GET|POST /api/v1/{assets,liabilities,investments}`, `DELETE .../:id`
//! - `GET /api/v1/networth` - Current value and history
//! - `POST /api/v1/networth/rebuild` - Fill missing months
//! - `GET /api/v1/networth/sparkline.svg` - History chart
//!
//! ## Import
//! - `POST /api/v1/import/preview`, `POST /api/v1/import/commit`
//!
//! ## Settings and queue
//! - `GET|PUT /api/v1/settings`
//! - `GET|POST /api/v1/queue`, `POST /api/v1/queue/flush`
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use fintrack::api::{serve, AppState};
//! use fintrack::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::open(Config::load_default())?;
//!     serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::storage::HoldingKind;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_config = state.config.api.clone();

    let api_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        // Transaction routes
        .route(
            "/transactions",
            get(routes::transactions::list_transactions)
                .post(routes::transactions::create_transaction),
        )
        .route(
            "/transactions/:id",
            delete(routes::transactions::delete_transaction),
        )
        // Budget and rollover routes
        .route(
            "/budgets",
            get(routes::budgets::list_budgets).put(routes::budgets::set_budget),
        )
        .route("/budgets/status", get(routes::budgets::budget_status))
        .route("/budgets/:id", delete(routes::budgets::delete_budget))
        .route("/rollovers", get(routes::budgets::list_rollovers))
        .route(
            "/rollovers/recompute",
            post(routes::budgets::recompute_rollovers),
        )
        // Goal routes
        .route(
            "/goals",
            get(routes::goals::list_goals).post(routes::goals::create_goal),
        )
        .route("/goals/:id", delete(routes::goals::delete_goal))
        .route("/goals/:id/progress", post(routes::goals::add_progress))
        .route("/goals/:id/reset", post(routes::goals::reset_goal))
        // Net worth routes
        .nest("/assets", routes::holdings::router(HoldingKind::Asset))
        .nest("/liabilities", routes::holdings::router(HoldingKind::Liability))
        .nest("/investments", routes::holdings::router(HoldingKind::Investment))
        .route("/networth", get(routes::networth::get_net_worth))
        .route("/networth/rebuild", post(routes::networth::rebuild_history))
        .route("/networth/sparkline.svg", get(routes::networth::sparkline))
        // Import routes
        .route("/import/preview", post(routes::import::preview))
        .route("/import/commit", post(routes::import::commit))
        // Settings routes
        .route(
            "/settings",
            get(routes::settings::get_settings).put(routes::settings::update_settings),
        )
        // Queue routes
        .route(
            "/queue",
            get(routes::queue::list_queue).post(routes::queue::enqueue),
        )
        .route("/queue/flush", post(routes::queue::flush))
        .layer(DefaultBodyLimit::max(api_config.max_body_bytes));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(
            api_config.request_timeout_secs.max(1),
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&api_config.cors_origins))
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Fintrack API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Fintrack API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
