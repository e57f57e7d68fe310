use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::*;
use crate::services::ledger;
use crate::AppState;

use super::{created, today, ApiError, ApiJson};

pub async fn create_rent(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateRentRequest>,
) -> Result<(axum::http::StatusCode, Json<Rent>), ApiError> {
    let rent = ledger::create_rent(&state.store, &auth.session(), &req).await?;
    Ok(created(rent))
}

pub async fn update_rent_status(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Rent>, ApiError> {
    let rent =
        ledger::update_rent_status(&state.store, &auth.session(), &id, req.status, today()).await?;
    Ok(Json(rent))
}
