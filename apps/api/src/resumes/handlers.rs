use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::Resume;
use crate::resumes::upload::{ingest_resume_upload, ResumeUpload};
use crate::resumes::{self, CreateResumeRequest, UpdateResumeRequest};
use crate::state::AppState;
use crate::tailoring::service::{tailor_resume, TailorOutcome, TailorResumeBody};

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(
        resumes::list_resumes(state.backend.as_ref(), user.user_id).await?,
    ))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let resume = resumes::create_resume(state.backend.as_ref(), user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(
        resumes::get_resume(state.backend.as_ref(), user.user_id, id).await?,
    ))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<Resume>, AppError> {
    Ok(Json(
        resumes::update_resume(state.backend.as_ref(), user.user_id, id, req).await?,
    ))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    resumes::delete_resume(state.backend.as_ref(), user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/upload
/// Multipart form: `file` (PDF, required) and `title` (optional).
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Resume>), AppError> {
    let mut file = None;
    let mut title = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read file: {e}")))?;
                file = Some((file_name, bytes));
            }
            Some("title") => {
                title = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("invalid title: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("missing 'file' field".to_string()))?;

    let resume = ingest_resume_upload(
        state.backend.as_ref(),
        &state.storage,
        user.user_id,
        ResumeUpload {
            file_name,
            title,
            bytes,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// POST /api/v1/resumes/:id/tailor
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<TailorResumeBody>,
) -> Result<Json<TailorOutcome>, AppError> {
    let outcome = tailor_resume(
        state.backend.as_ref(),
        state.tailor.as_ref(),
        user.user_id,
        id,
        body,
    )
    .await?;
    Ok(Json(outcome))
}
