//! Transaction Routes
//!
//! - GET /api/v1/transactions - List, newest first (`?month=YYYY-MM`)
//! - POST /api/v1/transactions - Record a transaction
//! - DELETE /api/v1/transactions/:id - Delete a transaction

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{CreateTransactionRequest, ListResponse, MonthQuery};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::storage::Transaction;

/// GET /api/v1/transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Json<ListResponse<Transaction>>> {
    Ok(Json(state.ledger.transactions(query.month)?.into()))
}

/// POST /api/v1/transactions
///
/// Rollovers are recomputed from the transaction's month.
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let tx = state.ledger.add_transaction(req.into()).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// DELETE /api/v1/transactions/:id
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(state.ledger.delete_transaction(&id).await?))
}
