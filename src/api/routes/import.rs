//! Import Routes
//!
//! - POST /api/v1/import/preview - Detect format and parse without writing
//! - POST /api/v1/import/commit - Import valid rows and remember the mapping

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::ImportRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::import::{ImportPreview, ImportSummary};

/// POST /api/v1/import/preview
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<Json<ImportPreview>> {
    let currency = state.ledger.settings()?.currency;
    let preview = state.importer.preview(&req.csv, &currency, req.mapping)?;
    Ok(Json(preview))
}

/// POST /api/v1/import/commit
pub async fn commit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportRequest>,
) -> ApiResult<Json<ImportSummary>> {
    let summary = state
        .importer
        .commit(&state.ledger, &req.csv, req.mapping)
        .await?;
    Ok(Json(summary))
}
