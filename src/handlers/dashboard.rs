use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::models::{Dashboard, LandlordDashboard, TenantDashboard};
use crate::services::dashboard;
use crate::AppState;

use super::{today, ApiError};

/// GET /api/dashboard
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>, ApiError> {
    let view = dashboard::dashboard_for(&state.store, &auth.session(), today()).await?;
    Ok(Json(view))
}

/// GET /api/dashboard/tenant
pub async fn get_tenant_dashboard(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TenantDashboard>, ApiError> {
    let view = dashboard::tenant_dashboard(&state.store, &auth.session(), today()).await?;
    Ok(Json(view))
}

/// GET /api/dashboard/landlord
pub async fn get_landlord_dashboard(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LandlordDashboard>, ApiError> {
    let view = dashboard::landlord_dashboard(&state.store, &auth.session(), today()).await?;
    Ok(Json(view))
}
