//! Holding Routes
//!
//! The asset, liability and investment lists share one set of handlers,
//! mounted once per list:
//!
//! - GET /api/v1/{assets,liabilities,investments} - List entries
//! - POST /api/v1/{assets,liabilities,investments} - Add an entry
//! - DELETE /api/v1/{assets,liabilities,investments}/:id - Remove an entry

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use std::sync::Arc;

use crate::api::dto::{CreateHoldingRequest, ListResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::storage::{Holding, HoldingKind};

/// Routes for one holding list, to be nested under its path
pub fn router(kind: HoldingKind) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(move |state: State<Arc<AppState>>| list_holdings(state, kind)).post(
                move |state: State<Arc<AppState>>, body: Json<CreateHoldingRequest>| {
                    create_holding(state, kind, body)
                },
            ),
        )
        .route(
            "/:id",
            delete(move |state: State<Arc<AppState>>, id: Path<String>| {
                delete_holding(state, kind, id)
            }),
        )
}

async fn list_holdings(
    State(state): State<Arc<AppState>>,
    kind: HoldingKind,
) -> ApiResult<Json<ListResponse<Holding>>> {
    Ok(Json(state.ledger.holdings(kind)?.into()))
}

async fn create_holding(
    State(state): State<Arc<AppState>>,
    kind: HoldingKind,
    Json(req): Json<CreateHoldingRequest>,
) -> ApiResult<(StatusCode, Json<Holding>)> {
    let holding = state.ledger.add_holding(kind, &req.name, req.value)?;
    Ok((StatusCode::CREATED, Json(holding)))
}

async fn delete_holding(
    State(state): State<Arc<AppState>>,
    kind: HoldingKind,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.ledger.delete_holding(kind, &id)?;
    Ok(StatusCode::NO_CONTENT)
}
