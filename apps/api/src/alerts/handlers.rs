use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::alerts::{self, AlertMatches, CreateAlertRequest};
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::alert::{AlertFrequency, JobAlert};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct FrequencyUpdate {
    pub frequency: AlertFrequency,
}

/// GET /api/v1/alerts
pub async fn handle_list_alerts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<JobAlert>>, AppError> {
    Ok(Json(
        alerts::list_alerts(state.backend.as_ref(), user.user_id).await?,
    ))
}

/// POST /api/v1/alerts
pub async fn handle_create_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateAlertRequest>,
) -> Result<(StatusCode, Json<JobAlert>), AppError> {
    let alert = alerts::create_alert(state.backend.as_ref(), user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

/// PATCH /api/v1/alerts/:id
pub async fn handle_update_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<FrequencyUpdate>,
) -> Result<Json<JobAlert>, AppError> {
    let alert =
        alerts::update_alert_frequency(state.backend.as_ref(), user.user_id, id, req.frequency)
            .await?;
    Ok(Json(alert))
}

/// DELETE /api/v1/alerts/:id
pub async fn handle_delete_alert(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    alerts::delete_alert(state.backend.as_ref(), user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/alerts/:id/matches
pub async fn handle_alert_matches(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<AlertMatches>, AppError> {
    Ok(Json(
        alerts::alert_matches(state.backend.as_ref(), user.user_id, id).await?,
    ))
}
