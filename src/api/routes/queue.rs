//! Offline Queue Routes
//!
//! - GET /api/v1/queue - Pending actions, oldest first
//! - POST /api/v1/queue - Queue an action
//! - POST /api/v1/queue/flush - Deliver pending actions to the remote

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{EnqueueRequest, ListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::queue::{FlushSummary, QueuedAction};

/// GET /api/v1/queue
pub async fn list_queue(State(state): State<Arc<AppState>>) -> Json<ListResponse<QueuedAction>> {
    Json(state.queue.list().into())
}

/// POST /api/v1/queue
pub async fn enqueue(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnqueueRequest>,
) -> ApiResult<(StatusCode, Json<QueuedAction>)> {
    let action = state.queue.enqueue(&req.kind, req.payload)?;
    Ok((StatusCode::CREATED, Json(action)))
}

/// POST /api/v1/queue/flush
///
/// Without a configured remote the queue is left untouched.
pub async fn flush(State(state): State<Arc<AppState>>) -> ApiResult<Json<FlushSummary>> {
    let remote = state
        .remote
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("Remote is not configured".to_string()))?;
    Ok(Json(state.queue.flush(remote.as_ref()).await))
}
