use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::cache::QueryKey;
use crate::errors::AppError;
use crate::jobs::saved;
use crate::jobs::search::{JobPage, JobSearchFilters, PageRequest};
use crate::jobs::seo::SeoMeta;
use crate::models::job::{Job, JobType, SavedJobListing};
use crate::state::AppState;
use crate::util::normalize_terms;

/// Query string of the search endpoint. `keywords` is comma-separated.
#[derive(Debug, Default, Deserialize)]
pub struct JobSearchParams {
    pub query: Option<String>,
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub remote: Option<bool>,
    pub salary_min: Option<i32>,
    pub posted_within_days: Option<i32>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl JobSearchParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn into_filters(self) -> Result<JobSearchFilters, AppError> {
        if let Some(days) = self.posted_within_days {
            if days <= 0 {
                return Err(AppError::Validation(
                    "posted_within_days must be positive".to_string(),
                ));
            }
        }
        if self.salary_min.is_some_and(|s| s < 0) {
            return Err(AppError::Validation(
                "salary_min cannot be negative".to_string(),
            ));
        }

        let keywords = self
            .keywords
            .as_deref()
            .map(|k| normalize_terms(k.split(',')))
            .unwrap_or_default();

        Ok(JobSearchFilters {
            query: self.query,
            keywords,
            location: self.location,
            job_type: self.job_type,
            remote: self.remote,
            salary_min: self.salary_min,
            posted_within_days: self.posted_within_days,
        })
    }
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: Job,
    pub seo: SeoMeta,
    /// Always false for anonymous callers.
    pub is_saved: bool,
}

#[derive(Serialize)]
pub struct SavedStatus {
    pub job_id: Uuid,
    pub is_saved: bool,
}

/// GET /api/v1/jobs
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = params.page_request();
    let filters = params.into_filters()?;
    let fingerprint = serde_json::to_string(&filters).map_err(anyhow::Error::from)?;
    let key = QueryKey::new("jobs")
        .part(fingerprint)
        .part(page.page)
        .part(page.page_size);

    let backend = state.backend.clone();
    let result = state
        .cache
        .fetch(&key, || async move {
            Ok(backend.search_jobs(&filters, page).await?)
        })
        .await?;
    Ok(Json(result))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = state
        .backend
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let is_saved = match user {
        Some(user) => saved::is_saved_job(state.backend.as_ref(), user.user_id, id).await?,
        None => false,
    };

    Ok(Json(JobDetailResponse {
        seo: SeoMeta::for_job(&job),
        job,
        is_saved,
    }))
}

/// GET /api/v1/jobs/saved
pub async fn handle_list_saved_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<SavedJobListing>>, AppError> {
    let saved = saved::list_saved_jobs(state.backend.as_ref(), user.user_id).await?;
    Ok(Json(saved))
}

/// GET /api/v1/jobs/:id/save
pub async fn handle_saved_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SavedStatus>, AppError> {
    let is_saved = saved::is_saved_job(state.backend.as_ref(), user.user_id, id).await?;
    Ok(Json(SavedStatus {
        job_id: id,
        is_saved,
    }))
}

/// POST /api/v1/jobs/:id/save
/// Saving an already-saved job is a no-op success.
pub async fn handle_save_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.backend.get_job(id).await?.is_none() {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    saved::save_job(state.backend.as_ref(), user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/jobs/:id/save
pub async fn handle_unsave_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    saved::unsave_job(state.backend.as_ref(), user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
