use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::{LoginRequest, LoginResponse, SignupRequest, User};
use crate::services::accounts;
use crate::AppState;

use super::{created, ApiError, ApiJson};

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<(axum::http::StatusCode, Json<User>), ApiError> {
    let user = accounts::signup(&state.store, &req).await?;
    Ok(created(user))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = accounts::authenticate(&state.store, &req).await?;

    let token = crate::auth::issue_token(&state.config, &user).map_err(|e| {
        tracing::error!("Token generation error: {}", e);
        ApiError::internal("token generation error")
    })?;

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        full_name: user.full_name,
        role: user.role,
    }))
}
