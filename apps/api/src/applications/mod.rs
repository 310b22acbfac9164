//! Application tracking: the jobs a user has applied to and where each one
//! stands.

pub mod dashboard;
pub mod handlers;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::util::non_blank;

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub job_id: Option<Uuid>,
    /// May be omitted when `job_id` is given; taken from the listing.
    pub position: Option<String>,
    pub company: Option<String>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<String>,
}

pub async fn list_applications(
    backend: &dyn Backend,
    user_id: Uuid,
    status: Option<ApplicationStatus>,
) -> Result<Vec<Application>, AppError> {
    Ok(backend.list_applications(user_id, status).await?)
}

pub async fn create_application(
    backend: &dyn Backend,
    user_id: Uuid,
    req: CreateApplicationRequest,
) -> Result<Application, AppError> {
    let mut position = non_blank(req.position.as_deref());
    let mut company = non_blank(req.company.as_deref());

    if let Some(job_id) = req.job_id {
        let job = backend
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        position.get_or_insert(job.title);
        company.get_or_insert(job.company);
    }

    let position =
        position.ok_or_else(|| AppError::Validation("position is required".to_string()))?;
    let company =
        company.ok_or_else(|| AppError::Validation("company is required".to_string()))?;

    let application = backend
        .create_application(NewApplication {
            user_id,
            job_id: req.job_id,
            position,
            company,
            status: req.status.unwrap_or(ApplicationStatus::Applied),
            notes: non_blank(req.notes.as_deref()),
        })
        .await?;

    info!(
        "User {user_id} tracked application {} ({})",
        application.id, application.status
    );
    Ok(application)
}

pub async fn update_application_status(
    backend: &dyn Backend,
    user_id: Uuid,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, AppError> {
    backend
        .update_application_status(user_id, application_id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
}

pub async fn delete_application(
    backend: &dyn Backend,
    user_id: Uuid,
    application_id: Uuid,
) -> Result<(), AppError> {
    if backend.delete_application(user_id, application_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!(
            "Application {application_id} not found"
        )))
    }
}
