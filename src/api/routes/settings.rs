//! Settings Routes
//!
//! - GET /api/v1/settings - Categories, currency and rollover flag
//! - PUT /api/v1/settings - Partial update

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::ledger::SettingsUpdate;
use crate::storage::Settings;

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<Arc<AppState>>) -> ApiResult<Json<Settings>> {
    Ok(Json(state.ledger.settings()?))
}

/// PUT /api/v1/settings
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> ApiResult<Json<Settings>> {
    Ok(Json(state.ledger.update_settings(update).await?))
}
