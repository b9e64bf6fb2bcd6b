//! Budget and Rollover Routes
//!
//! - GET /api/v1/budgets - List budgets (`?month=YYYY-MM`)
//! - PUT /api/v1/budgets - Create or replace a month/category budget
//! - DELETE /api/v1/budgets/:id - Delete a budget
//! - GET /api/v1/budgets/status - Budget, rollover, spent and available per category
//! - GET /api/v1/rollovers - List carried amounts (`?month=YYYY-MM`)
//! - POST /api/v1/rollovers/recompute - Recompute from a month, or catch up

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    ListResponse, MonthQuery, RecomputeRequest, RecomputeResponse, SetBudgetRequest,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::ledger::BudgetStatus;
use crate::storage::{Budget, Rollover};

/// GET /api/v1/budgets
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<ListResponse<Budget>>> {
    Ok(Json(state.ledger.budgets(query.month)?.into()))
}

/// PUT /api/v1/budgets
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetBudgetRequest>,
) -> ApiResult<Json<Budget>> {
    let budget = state
        .ledger
        .set_budget(req.month, &req.category, req.amount)
        .await?;
    Ok(Json(budget))
}

/// DELETE /api/v1/budgets/:id
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Budget>> {
    Ok(Json(state.ledger.delete_budget(&id).await?))
}

/// GET /api/v1/budgets/status
///
/// Defaults to the current month.
pub async fn budget_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<ListResponse<BudgetStatus>>> {
    let month = query
        .month
        .unwrap_or_else(|| state.ledger.clock().current_month());
    Ok(Json(state.ledger.budget_status(month)?.into()))
}

/// GET /api/v1/rollovers
pub async fn list_rollovers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<ListResponse<Rollover>>> {
    Ok(Json(state.ledger.rollovers(query.month)?.into()))
}

/// POST /api/v1/rollovers/recompute
pub async fn recompute_rollovers(
    State(state): State<Arc<AppState>>,
    body: Option<Json<RecomputeRequest>>,
) -> ApiResult<Json<RecomputeResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let months_processed = match req.from {
        Some(month) => state.ledger.recompute_rollovers_from(month).await?,
        None => state.ledger.ensure_rollover_processing().await?.months_processed,
    };
    Ok(Json(RecomputeResponse {
        months_processed,
        last_processed: state.ledger.last_processed_month()?,
    }))
}
