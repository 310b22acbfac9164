//! Saved job searches. An alert remembers a query and keyword list; its
//! matches are the jobs that search currently returns.

pub mod handlers;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::jobs::pagination::collect_pages;
use crate::jobs::search::{JobSearchFilters, PageRequest};
use crate::models::alert::{AlertFrequency, JobAlert, NewJobAlert};
use crate::models::job::Job;
use crate::util::{non_blank, normalize_terms};

pub const MAX_MATCH_PAGES: usize = 5;
pub const MATCH_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct CreateAlertRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub frequency: Option<AlertFrequency>,
}

#[derive(Debug, Serialize)]
pub struct AlertMatches {
    pub alert: JobAlert,
    pub jobs: Vec<Job>,
    pub pages_fetched: usize,
    /// More matches exist beyond the pages fetched.
    pub has_more: bool,
}

/// Validates a create request: a query or at least one keyword is required.
pub fn new_alert(user_id: Uuid, req: CreateAlertRequest) -> Result<NewJobAlert, AppError> {
    let query = req.query.trim().to_string();
    let keywords = normalize_terms(req.keywords);
    if query.is_empty() && keywords.is_empty() {
        return Err(AppError::Validation(
            "an alert needs a search query or at least one keyword".to_string(),
        ));
    }

    Ok(NewJobAlert {
        user_id,
        query,
        keywords,
        location: non_blank(req.location.as_deref()),
        frequency: req.frequency.unwrap_or_default(),
    })
}

pub async fn list_alerts(backend: &dyn Backend, user_id: Uuid) -> Result<Vec<JobAlert>, AppError> {
    Ok(backend.list_alerts(user_id).await?)
}

pub async fn create_alert(
    backend: &dyn Backend,
    user_id: Uuid,
    req: CreateAlertRequest,
) -> Result<JobAlert, AppError> {
    let alert = backend.create_alert(new_alert(user_id, req)?).await?;
    info!(
        "User {user_id} created {} alert {} ({} keywords)",
        alert.frequency.as_str(),
        alert.id,
        alert.keywords.len()
    );
    Ok(alert)
}

pub async fn update_alert_frequency(
    backend: &dyn Backend,
    user_id: Uuid,
    alert_id: Uuid,
    frequency: AlertFrequency,
) -> Result<JobAlert, AppError> {
    backend
        .update_alert_frequency(user_id, alert_id, frequency)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert {alert_id} not found")))
}

pub async fn delete_alert(
    backend: &dyn Backend,
    user_id: Uuid,
    alert_id: Uuid,
) -> Result<(), AppError> {
    if backend.delete_alert(user_id, alert_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Alert {alert_id} not found")))
    }
}

/// Runs the alert's search, accumulating up to `MAX_MATCH_PAGES` pages.
pub async fn alert_matches(
    backend: &dyn Backend,
    user_id: Uuid,
    alert_id: Uuid,
) -> Result<AlertMatches, AppError> {
    let alert = backend
        .get_alert(user_id, alert_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Alert {alert_id} not found")))?;

    let filters = JobSearchFilters::from_alert(&alert);
    let pages = collect_pages(MAX_MATCH_PAGES, |page| {
        let filters = &filters;
        async move {
            backend
                .search_jobs(filters, PageRequest::new(Some(page), Some(MATCH_PAGE_SIZE)))
                .await
        }
    })
    .await?;

    let pages_fetched = pages.page_count();
    let has_more = pages.has_next_page();
    debug!("Alert {alert_id}: {} matches over {pages_fetched} pages", pages.len());

    Ok(AlertMatches {
        alert,
        jobs: pages.into_items(),
        pages_fetched,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::{sample_job, MemoryBackend};

    fn request(query: &str, keywords: &[&str]) -> CreateAlertRequest {
        CreateAlertRequest {
            query: query.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            location: None,
            frequency: None,
        }
    }

    #[test]
    fn test_query_or_keyword_required() {
        let err = new_alert(Uuid::new_v4(), request("  ", &[" ", ""])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(new_alert(Uuid::new_v4(), request("", &["rust"])).is_ok());
        assert!(new_alert(Uuid::new_v4(), request("backend", &[])).is_ok());
    }

    #[test]
    fn test_keywords_deduplicated_case_insensitively() {
        let alert = new_alert(Uuid::new_v4(), request("", &[" Rust", "rust", "Tokio "])).unwrap();
        assert_eq!(alert.keywords, vec!["Rust", "Tokio"]);
        assert_eq!(alert.frequency, AlertFrequency::Daily);
    }

    #[tokio::test]
    async fn test_matches_accumulate_across_pages() {
        let jobs: Vec<Job> = (0..45)
            .map(|i| sample_job(&format!("Rust Engineer {i}"), "Ferrous"))
            .chain((0..3).map(|i| sample_job(&format!("Designer {i}"), "Pixel")))
            .collect();
        let backend = MemoryBackend::with_jobs(jobs);
        let user_id = Uuid::new_v4();
        let alert = create_alert(&backend, user_id, request("", &["rust"]))
            .await
            .unwrap();

        let matches = alert_matches(&backend, user_id, alert.id).await.unwrap();

        assert_eq!(matches.jobs.len(), 45);
        assert_eq!(matches.pages_fetched, 3);
        assert!(!matches.has_more);
    }

    #[tokio::test]
    async fn test_matches_stop_at_page_limit() {
        let jobs: Vec<Job> = (0..120)
            .map(|i| sample_job(&format!("Engineer {i}"), "Acme"))
            .collect();
        let backend = MemoryBackend::with_jobs(jobs);
        let user_id = Uuid::new_v4();
        let alert = create_alert(&backend, user_id, request("engineer", &[]))
            .await
            .unwrap();

        let matches = alert_matches(&backend, user_id, alert.id).await.unwrap();

        assert_eq!(matches.pages_fetched, MAX_MATCH_PAGES);
        assert_eq!(matches.jobs.len(), 100);
        assert!(matches.has_more);
    }

    #[tokio::test]
    async fn test_frequency_update_and_delete_are_user_scoped() {
        let backend = MemoryBackend::default();
        let owner = Uuid::new_v4();
        let alert = create_alert(&backend, owner, request("rust", &[])).await.unwrap();

        assert!(matches!(
            update_alert_frequency(&backend, Uuid::new_v4(), alert.id, AlertFrequency::Weekly).await,
            Err(AppError::NotFound(_))
        ));
        let updated = update_alert_frequency(&backend, owner, alert.id, AlertFrequency::Weekly)
            .await
            .unwrap();
        assert_eq!(updated.frequency, AlertFrequency::Weekly);

        delete_alert(&backend, owner, alert.id).await.unwrap();
        assert!(list_alerts(&backend, owner).await.unwrap().is_empty());
        assert!(matches!(
            delete_alert(&backend, owner, alert.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
