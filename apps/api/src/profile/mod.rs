//! User profile and onboarding progress.

pub mod handlers;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::profile::{Profile, ProfileUpdate};
use crate::util::normalize_terms;

/// Onboarding runs through steps `0..=ONBOARDING_FINAL_STEP`.
pub const ONBOARDING_FINAL_STEP: i32 = 4;

#[derive(Debug, Deserialize)]
pub struct OnboardingUpdate {
    pub step: i32,
    pub completed: Option<bool>,
}

pub async fn get_profile(backend: &dyn Backend, user_id: Uuid) -> Result<Profile, AppError> {
    backend
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Cleans an incoming update: blank strings clear nothing, skills are
/// trimmed and de-duplicated.
fn normalize_update(mut update: ProfileUpdate) -> Result<ProfileUpdate, AppError> {
    for field in [
        &mut update.email,
        &mut update.full_name,
        &mut update.phone,
        &mut update.location,
        &mut update.headline,
    ] {
        if let Some(value) = field.take() {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                *field = Some(trimmed.to_string());
            }
        }
    }

    if let Some(email) = &update.email {
        if !email.contains('@') {
            return Err(AppError::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }
    }

    update.skills = update.skills.map(normalize_terms);
    Ok(update)
}

pub async fn upsert_profile(
    backend: &dyn Backend,
    user_id: Uuid,
    update: ProfileUpdate,
) -> Result<Profile, AppError> {
    let update = normalize_update(update)?;
    Ok(backend.upsert_profile(user_id, &update).await?)
}

/// Records onboarding progress. Reaching the final step completes onboarding.
/// A user who has no profile row yet gets an empty one first.
pub async fn advance_onboarding(
    backend: &dyn Backend,
    user_id: Uuid,
    update: OnboardingUpdate,
) -> Result<Profile, AppError> {
    if !(0..=ONBOARDING_FINAL_STEP).contains(&update.step) {
        return Err(AppError::Validation(format!(
            "onboarding step must be between 0 and {ONBOARDING_FINAL_STEP}, got {}",
            update.step
        )));
    }
    let completed = update.step == ONBOARDING_FINAL_STEP || update.completed.unwrap_or(false);

    if let Some(profile) = backend
        .update_onboarding(user_id, update.step, completed)
        .await?
    {
        return Ok(log_progress(profile));
    }

    backend
        .upsert_profile(user_id, &ProfileUpdate::default())
        .await?;
    let profile = backend
        .update_onboarding(user_id, update.step, completed)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(log_progress(profile))
}

fn log_progress(profile: Profile) -> Profile {
    if profile.onboarding_completed {
        info!("User {} completed onboarding", profile.id);
    } else {
        info!(
            "User {} at onboarding step {}",
            profile.id, profile.onboarding_step
        );
    }
    profile
}
