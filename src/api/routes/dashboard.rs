//! Dashboard Route
//!
//! - GET /api/v1/dashboard - Current month summary

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::ledger::DashboardSummary;

/// GET /api/v1/dashboard
///
/// Catches up rollovers and refreshes this month's net worth snapshot before
/// summarizing, so the numbers are current even after weeks offline.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(state.ledger.dashboard().await?))
}
