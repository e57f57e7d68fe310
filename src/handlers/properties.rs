use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::*;
use crate::services::portfolio;
use crate::AppState;

use super::{created, ApiError, ApiJson};

pub async fn list_properties(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Property>>, ApiError> {
    let properties = portfolio::list_properties(&state.store, &auth.session()).await?;
    Ok(Json(properties))
}

pub async fn create_property(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreatePropertyRequest>,
) -> Result<(axum::http::StatusCode, Json<Property>), ApiError> {
    let property = portfolio::create_property(&state.store, &auth.session(), &req).await?;
    Ok(created(property))
}
