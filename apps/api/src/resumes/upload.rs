//! Resume file upload: store the PDF, extract its text, parse it and create
//! a resume pre-filled from the parse.

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::resume::{NewResume, Resume};
use crate::resumes::parser::{content_from_parsed, parse_resume_text};
use crate::storage::{resume_object_key, ObjectStore};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const DEFAULT_TITLE: &str = "Uploaded resume";

pub struct ResumeUpload {
    pub file_name: Option<String>,
    pub title: Option<String>,
    pub bytes: Bytes,
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

pub fn validate_upload(upload: &ResumeUpload) -> Result<(), AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(format!(
            "uploaded file exceeds {} MiB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    if !is_pdf(&upload.bytes) {
        return Err(AppError::UnprocessableEntity(
            "only PDF resumes are supported".to_string(),
        ));
    }
    Ok(())
}

/// Title for an uploaded resume: explicit title, else the file name without
/// its extension, else a generic fallback.
pub fn upload_title(title: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    file_name
        .map(str::trim)
        .map(|name| {
            name.rsplit_once('.')
                .filter(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
                .map_or(name, |(stem, _)| stem)
        })
        .filter(|stem| !stem.is_empty())
        .map_or_else(|| DEFAULT_TITLE.to_string(), str::to_string)
}

/// Extracts text on a blocking thread; PDF decoding is CPU-bound.
/// pdf-extract can panic on malformed files, so a failed task counts as an
/// unreadable PDF.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AppError::UnprocessableEntity("could not read PDF".to_string())
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("could not read PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "PDF contains no extractable text".to_string(),
        ));
    }
    Ok(text)
}

pub async fn ingest_resume_upload(
    backend: &dyn Backend,
    storage: &dyn ObjectStore,
    user_id: Uuid,
    upload: ResumeUpload,
) -> Result<Resume, AppError> {
    validate_upload(&upload)?;

    let text = extract_pdf_text(upload.bytes.clone()).await?;
    let parsed = parse_resume_text(&text);
    info!(
        "Parsed uploaded resume for user {user_id}: {} sections, {} skills",
        parsed.sections.len(),
        parsed.skills.len()
    );

    let new = NewResume {
        user_id,
        title: upload_title(upload.title.as_deref(), upload.file_name.as_deref()),
        content: content_from_parsed(&parsed),
        parsed: Some(parsed),
        file_url: None,
    };
    let key = resume_object_key(user_id, Uuid::new_v4());
    store_resume_file(backend, storage, &key, upload.bytes, new).await
}

/// Uploads the file, then records the resume pointing at it. A failed insert
/// removes the uploaded object again.
pub async fn store_resume_file(
    backend: &dyn Backend,
    storage: &dyn ObjectStore,
    key: &str,
    bytes: Bytes,
    mut new: NewResume,
) -> Result<Resume, AppError> {
    new.file_url = Some(storage.upload(key, bytes, PDF_CONTENT_TYPE).await?);

    match backend.create_resume(new).await {
        Ok(resume) => Ok(resume),
        Err(e) => {
            if let Err(cleanup) = storage.delete(key).await {
                warn!("Could not remove orphaned upload {key}: {cleanup}");
            }
            Err(e.into())
        }
    }
}
