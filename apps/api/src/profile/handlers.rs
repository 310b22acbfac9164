use axum::{extract::State, Json};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileUpdate};
use crate::profile::{self, OnboardingUpdate};
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        profile::get_profile(state.backend.as_ref(), user.user_id).await?,
    ))
}

/// PUT /api/v1/profile
/// Fields left out of the body keep their stored values. The token's email
/// seeds the profile when the body carries none.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(mut update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    if update.email.is_none() {
        update.email = user.email;
    }
    Ok(Json(
        profile::upsert_profile(state.backend.as_ref(), user.user_id, update).await?,
    ))
}

/// PATCH /api/v1/profile/onboarding
pub async fn handle_update_onboarding(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<OnboardingUpdate>,
) -> Result<Json<Profile>, AppError> {
    Ok(Json(
        profile::advance_onboarding(state.backend.as_ref(), user.user_id, req).await?,
    ))
}
