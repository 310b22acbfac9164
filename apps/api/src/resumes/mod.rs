// Resume CRUD, file upload and parsing, and score presentation helpers.

pub mod handlers;
pub mod parser;
pub mod scoring;
pub mod upload;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::resume::{NewResume, Resume, ResumeContent, ResumeUpdate};
use crate::util::non_blank;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    #[serde(default)]
    pub content: ResumeContent,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub content: Option<ResumeContent>,
}

fn not_found(resume_id: Uuid) -> AppError {
    AppError::NotFound(format!("Resume {resume_id} not found"))
}

pub async fn list_resumes(backend: &dyn Backend, user_id: Uuid) -> Result<Vec<Resume>, AppError> {
    Ok(backend.list_resumes(user_id).await?)
}

pub async fn get_resume(
    backend: &dyn Backend,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<Resume, AppError> {
    backend
        .get_resume(user_id, resume_id)
        .await?
        .ok_or_else(|| not_found(resume_id))
}

pub async fn create_resume(
    backend: &dyn Backend,
    user_id: Uuid,
    req: CreateResumeRequest,
) -> Result<Resume, AppError> {
    let title = non_blank(Some(&req.title))
        .ok_or_else(|| AppError::Validation("resume title is required".to_string()))?;

    let resume = backend
        .create_resume(NewResume {
            user_id,
            title,
            content: req.content,
            parsed: None,
            file_url: None,
        })
        .await?;
    info!("User {user_id} created resume {}", resume.id);
    Ok(resume)
}

pub async fn update_resume(
    backend: &dyn Backend,
    user_id: Uuid,
    resume_id: Uuid,
    req: UpdateResumeRequest,
) -> Result<Resume, AppError> {
    let title = match req.title {
        Some(title) => Some(
            non_blank(Some(&title))
                .ok_or_else(|| AppError::Validation("resume title cannot be blank".to_string()))?,
        ),
        None => None,
    };

    backend
        .update_resume(
            user_id,
            resume_id,
            ResumeUpdate {
                title,
                content: req.content,
                tailored_for_job_id: None,
            },
        )
        .await?
        .ok_or_else(|| not_found(resume_id))
}

pub async fn delete_resume(
    backend: &dyn Backend,
    user_id: Uuid,
    resume_id: Uuid,
) -> Result<(), AppError> {
    if backend.delete_resume(user_id, resume_id).await? {
        Ok(())
    } else {
        Err(not_found(resume_id))
    }
}
