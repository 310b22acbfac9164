use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{Backend, StoreError};
use crate::errors::AppError;
use crate::models::job::SavedJobListing;

/// Saves a job for a user. Saving an already-saved job succeeds: the
/// unique-constraint conflict is the expected outcome of a repeat save.
pub async fn save_job(backend: &dyn Backend, user_id: Uuid, job_id: Uuid) -> Result<(), AppError> {
    match backend.insert_saved_job(user_id, job_id).await {
        Ok(saved) => {
            info!("User {user_id} saved job {job_id} ({})", saved.id);
            Ok(())
        }
        Err(StoreError::UniqueViolation(_)) => {
            debug!("Job {job_id} already saved by user {user_id}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Removes a saved job. Returns whether a row was deleted.
pub async fn unsave_job(
    backend: &dyn Backend,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<bool, AppError> {
    Ok(backend.delete_saved_job(user_id, job_id).await?)
}

pub async fn is_saved_job(
    backend: &dyn Backend,
    user_id: Uuid,
    job_id: Uuid,
) -> Result<bool, AppError> {
    Ok(backend.find_saved_job(user_id, job_id).await?.is_some())
}

pub async fn list_saved_jobs(
    backend: &dyn Backend,
    user_id: Uuid,
) -> Result<Vec<SavedJobListing>, AppError> {
    Ok(backend.list_saved_jobs(user_id).await?)
}
