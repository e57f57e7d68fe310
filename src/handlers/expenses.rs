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

type Created = (axum::http::StatusCode, Json<Expense>);

pub async fn create_water_expense(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateMeterExpenseRequest>,
) -> Result<Created, ApiError> {
    let expense = ledger::create_water_expense(&state.store, &auth.session(), &req).await?;
    Ok(created(expense))
}

pub async fn create_electricity_expense(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateMeterExpenseRequest>,
) -> Result<Created, ApiError> {
    let expense = ledger::create_electricity_expense(&state.store, &auth.session(), &req).await?;
    Ok(created(expense))
}

pub async fn create_expense(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateFlatExpenseRequest>,
) -> Result<Created, ApiError> {
    let expense = ledger::create_flat_expense(&state.store, &auth.session(), &req).await?;
    Ok(created(expense))
}

pub async fn update_expense_status(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Expense>, ApiError> {
    let expense =
        ledger::update_expense_status(&state.store, &auth.session(), &id, req.status, today())
            .await?;
    Ok(Json(expense))
}

pub async fn adjust_expense_value(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AdjustValueRequest>,
) -> Result<Json<Expense>, ApiError> {
    let expense = ledger::adjust_expense_value(
        &state.store,
        &auth.session(),
        &id,
        req.value,
        req.note.as_deref(),
    )
    .await?;
    Ok(Json(expense))
}
