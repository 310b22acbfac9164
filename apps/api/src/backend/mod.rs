//! Backend: the interface every data-access call goes through.
//!
//! Each store trait covers one table family. `Backend` bundles them so
//! `AppState` can carry a single `Arc<dyn Backend>`. `PgBackend` is the
//! production implementation; tests use the in-memory one.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::jobs::search::{JobPage, JobSearchFilters, PageRequest};
use crate::models::alert::{AlertFrequency, JobAlert, NewJobAlert};
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::job::{Job, SavedJob, SavedJobListing};
use crate::models::profile::{Profile, ProfileUpdate};
use crate::models::resume::{NewResume, Resume, ResumeUpdate};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgBackend;

/// A failed backend call, carrying the backend's own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("{0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn search_jobs(
        &self,
        filters: &JobSearchFilters,
        page: PageRequest,
    ) -> StoreResult<JobPage>;

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<Job>>;
}

#[async_trait]
pub trait SavedJobStore: Send + Sync {
    /// Fails with `StoreError::UniqueViolation` when the pair already exists.
    async fn insert_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<SavedJob>;

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<bool>;

    async fn find_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<Option<SavedJob>>;

    async fn list_saved_jobs(&self, user_id: Uuid) -> StoreResult<Vec<SavedJobListing>>;

    async fn count_saved_jobs(&self, user_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn list_applications(
        &self,
        user_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<Application>>;

    async fn create_application(&self, new: NewApplication) -> StoreResult<Application>;

    async fn update_application_status(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>>;

    async fn delete_application(&self, user_id: Uuid, application_id: Uuid) -> StoreResult<bool>;

    /// Count-only query; never loads rows.
    async fn count_applications(
        &self,
        user_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<i64>;
}

#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn list_alerts(&self, user_id: Uuid) -> StoreResult<Vec<JobAlert>>;

    async fn get_alert(&self, user_id: Uuid, alert_id: Uuid) -> StoreResult<Option<JobAlert>>;

    async fn create_alert(&self, new: NewJobAlert) -> StoreResult<JobAlert>;

    async fn update_alert_frequency(
        &self,
        user_id: Uuid,
        alert_id: Uuid,
        frequency: AlertFrequency,
    ) -> StoreResult<Option<JobAlert>>;

    async fn delete_alert(&self, user_id: Uuid, alert_id: Uuid) -> StoreResult<bool>;

    async fn count_alerts(&self, user_id: Uuid) -> StoreResult<i64>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>>;

    async fn upsert_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> StoreResult<Profile>;

    async fn update_onboarding(
        &self,
        user_id: Uuid,
        step: i32,
        completed: bool,
    ) -> StoreResult<Option<Profile>>;
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn list_resumes(&self, user_id: Uuid) -> StoreResult<Vec<Resume>>;

    async fn get_resume(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<Option<Resume>>;

    async fn create_resume(&self, new: NewResume) -> StoreResult<Resume>;

    async fn update_resume(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        update: ResumeUpdate,
    ) -> StoreResult<Option<Resume>>;

    async fn delete_resume(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<bool>;
}

/// Everything the API needs from the hosted backend.
pub trait Backend:
    JobStore + SavedJobStore + ApplicationStore + AlertStore + ProfileStore + ResumeStore
{
}

impl<T> Backend for T where
    T: JobStore + SavedJobStore + ApplicationStore + AlertStore + ProfileStore + ResumeStore
{
}
