//! Net Worth Routes
//!
//! - GET /api/v1/networth - Current value and monthly history
//! - POST /api/v1/networth/rebuild - Fill missing months of history
//! - GET /api/v1/networth/sparkline.svg - History as an SVG sparkline

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{RebuildResponse, SparklineQuery};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::ledger::NetWorthSummary;

const MAX_SPARKLINE_SIDE: f64 = 4096.0;

/// GET /api/v1/networth
///
/// Refreshes this month's snapshot first.
pub async fn get_net_worth(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<NetWorthSummary>> {
    state.ledger.ensure_current_month_snapshot()?;
    Ok(Json(state.ledger.net_worth_summary()?))
}

/// POST /api/v1/networth/rebuild
pub async fn rebuild_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RebuildResponse>> {
    let filled = state.ledger.rebuild_history()?;
    Ok(Json(RebuildResponse { filled }))
}

/// GET /api/v1/networth/sparkline.svg
pub async fn sparkline(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SparklineQuery>,
) -> ApiResult<impl IntoResponse> {
    for side in [query.width, query.height] {
        if !side.is_finite() || side <= 0.0 || side > MAX_SPARKLINE_SIDE {
            return Err(ApiError::Validation(format!(
                "Sparkline size must be between 0 and {}",
                MAX_SPARKLINE_SIDE
            )));
        }
    }

    let svg = state
        .ledger
        .sparkline_svg(query.width, query.height, &state.config.theme)?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
