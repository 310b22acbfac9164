use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::applications::dashboard::{load_dashboard_stats, DashboardStats};
use crate::applications::{self, CreateApplicationRequest};
use crate::auth::AuthUser;
use crate::cache::QueryKey;
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<ApplicationStatus>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

/// GET /api/v1/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<StatusQuery>,
) -> Result<Json<Vec<Application>>, AppError> {
    let rows =
        applications::list_applications(state.backend.as_ref(), user.user_id, params.status)
            .await?;
    Ok(Json(rows))
}

/// POST /api/v1/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let application =
        applications::create_application(state.backend.as_ref(), user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// PATCH /api/v1/applications/:id
pub async fn handle_update_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<Application>, AppError> {
    let application = applications::update_application_status(
        state.backend.as_ref(),
        user.user_id,
        id,
        req.status,
    )
    .await?;
    Ok(Json(application))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    applications::delete_application(state.backend.as_ref(), user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    let key = QueryKey::new("dashboard-stats").part(user.user_id);
    let stats = state
        .cache
        .fetch(&key, || load_dashboard_stats(state.backend.as_ref(), user.user_id))
        .await?;
    Ok(Json(stats))
}
