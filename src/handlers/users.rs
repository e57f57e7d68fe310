use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::{ReviewAccessRequest, User};
use crate::services::accounts;
use crate::AppState;

use super::{ApiError, ApiJson};

/// GET /api/profile
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, ApiError> {
    let user = accounts::profile(&state.store, &auth.session()).await?;
    Ok(Json(user))
}

/// POST /api/profile/landlord-access
pub async fn request_landlord_access(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, ApiError> {
    let user = accounts::request_landlord_access(&state.store, &auth.session()).await?;
    Ok(Json(user))
}

/// POST /api/access-requests/:user_id
pub async fn review_landlord_access(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<ReviewAccessRequest>,
) -> Result<Json<User>, ApiError> {
    let user =
        accounts::review_landlord_access(&state.store, &auth.session(), &user_id, req.approve)
            .await?;
    Ok(Json(user))
}
