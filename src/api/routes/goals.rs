//! Goal Routes
//!
//! - GET /api/v1/goals - List goals
//! - POST /api/v1/goals - Create a goal
//! - POST /api/v1/goals/:id/progress - Add (or withdraw) progress
//! - POST /api/v1/goals/:id/reset - Reset progress to zero
//! - DELETE /api/v1/goals/:id - Delete a goal

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CreateGoalRequest, GoalProgressRequest, ListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::Goal;

/// GET /api/v1/goals
pub async fn list_goals(State(state): State<Arc<AppState>>) -> ApiResult<Json<ListResponse<Goal>>> {
    Ok(Json(state.ledger.goals()?.into()))
}

/// POST /api/v1/goals
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = state.ledger.add_goal(&req.name, req.target, req.due)?;
    Ok((StatusCode::CREATED, Json(goal)))
}

/// POST /api/v1/goals/:id/progress
pub async fn add_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GoalProgressRequest>,
) -> ApiResult<Json<Goal>> {
    if !req.amount.is_finite() {
        return Err(ApiError::Validation("Amount must be a finite number".to_string()));
    }
    Ok(Json(state.ledger.add_goal_progress(&id, req.amount)?))
}

/// POST /api/v1/goals/:id/reset
pub async fn reset_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Goal>> {
    Ok(Json(state.ledger.reset_goal(&id)?))
}

/// DELETE /api/v1/goals/:id
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.ledger.delete_goal(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
