use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::billing;
use crate::models::*;
use crate::services::portfolio;
use crate::AppState;

use super::{created, today, ApiError, ApiJson};

pub async fn list_contracts(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ContractDetails>>, ApiError> {
    let contracts = portfolio::list_contracts(&state.store, &auth.session()).await?;
    Ok(Json(contracts))
}

pub async fn create_contract(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateContractRequest>,
) -> Result<(axum::http::StatusCode, Json<Contract>), ApiError> {
    let contract = portfolio::create_contract(&state.store, &auth.session(), &req).await?;
    Ok(created(contract))
}

#[derive(Debug, Deserialize)]
pub struct DueDateQuery {
    #[serde(default)]
    pub due_day: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DueDateResponse {
    pub due_date: NaiveDate,
}

/// GET /api/due-date?due_day=N
///
/// Suggested due date for a new rent or expense, used to prefill forms.
pub async fn suggest_due_date(
    _auth: AuthUser,
    Query(query): Query<DueDateQuery>,
) -> Result<Json<DueDateResponse>, ApiError> {
    if let Some(day) = query.due_day {
        if !(1..=31).contains(&day) {
            return Err(ApiError::unprocessable("due_day must be between 1 and 31"));
        }
    }
    Ok(Json(DueDateResponse {
        due_date: billing::default_due_date(today(), query.due_day),
    }))
}
