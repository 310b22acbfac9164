//! In-memory backend used by unit tests. Mirrors the uniqueness and
//! ownership rules the database enforces.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::backend::{
    AlertStore, ApplicationStore, JobStore, ProfileStore, ResumeStore, SavedJobStore, StoreError,
    StoreResult,
};
use crate::jobs::search::{JobPage, JobSearchFilters, PageRequest};
use crate::models::alert::{AlertFrequency, JobAlert, NewJobAlert};
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::job::{Job, JobType, SavedJob, SavedJobListing};
use crate::models::profile::{Profile, ProfileUpdate};
use crate::models::resume::{NewResume, Resume, ResumeUpdate};

#[derive(Default)]
pub struct MemoryBackend {
    jobs: Mutex<Vec<Job>>,
    saved_jobs: Mutex<Vec<SavedJob>>,
    applications: Mutex<Vec<Application>>,
    alerts: Mutex<Vec<JobAlert>>,
    profiles: Mutex<Vec<Profile>>,
    resumes: Mutex<Vec<Resume>>,
    /// When set, every call fails with this message.
    failure: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        let backend = Self::default();
        *backend.jobs.lock().unwrap() = jobs;
        backend
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> StoreResult<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(StoreError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

pub fn sample_job(title: &str, company: &str) -> Job {
    Job {
        id: Uuid::new_v4(),
        title: title.to_string(),
        company: company.to_string(),
        location: Some("Remote".to_string()),
        description: format!("{title} role at {company}"),
        job_type: JobType::FullTime,
        remote: true,
        salary_min: Some(90_000),
        salary_max: Some(140_000),
        apply_url: None,
        posted_at: Utc::now(),
        created_at: Utc::now(),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn job_matches(job: &Job, filters: &JobSearchFilters) -> bool {
    if let Some(q) = filters.query_text() {
        if !(contains_ci(&job.title, q) || contains_ci(&job.company, q) || contains_ci(&job.description, q)) {
            return false;
        }
    }
    let keywords: Vec<&str> = filters.keyword_terms().collect();
    if !keywords.is_empty()
        && !keywords
            .iter()
            .any(|k| contains_ci(&job.title, k) || contains_ci(&job.description, k))
    {
        return false;
    }
    if let Some(location) = filters.location_text() {
        if !job.location.as_deref().is_some_and(|l| contains_ci(l, location)) {
            return false;
        }
    }
    if let Some(job_type) = filters.job_type {
        if job.job_type != job_type {
            return false;
        }
    }
    if let Some(remote) = filters.remote {
        if job.remote != remote {
            return false;
        }
    }
    if let Some(salary_min) = filters.salary_min {
        if job.salary_max.is_some_and(|max| max < salary_min) {
            return false;
        }
    }
    if let Some(days) = filters.posted_within_days {
        if job.posted_at < Utc::now() - Duration::days(i64::from(days)) {
            return false;
        }
    }
    true
}

#[async_trait]
impl JobStore for MemoryBackend {
    async fn search_jobs(
        &self,
        filters: &JobSearchFilters,
        page: PageRequest,
    ) -> StoreResult<JobPage> {
        self.check()?;
        let mut matching: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|job| job_matches(job, filters))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        let total = matching.len() as i64;
        let jobs = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(JobPage::new(jobs, page, total))
    }

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<Job>> {
        self.check()?;
        Ok(self.jobs.lock().unwrap().iter().find(|j| j.id == job_id).cloned())
    }
}

#[async_trait]
impl SavedJobStore for MemoryBackend {
    async fn insert_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<SavedJob> {
        self.check()?;
        let mut saved = self.saved_jobs.lock().unwrap();
        if saved.iter().any(|s| s.user_id == user_id && s.job_id == job_id) {
            return Err(StoreError::UniqueViolation(
                "duplicate key value violates unique constraint \"saved_jobs_user_job_key\""
                    .to_string(),
            ));
        }
        let row = SavedJob {
            id: Uuid::new_v4(),
            user_id,
            job_id,
            created_at: Utc::now(),
        };
        saved.push(row.clone());
        Ok(row)
    }

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut saved = self.saved_jobs.lock().unwrap();
        let before = saved.len();
        saved.retain(|s| !(s.user_id == user_id && s.job_id == job_id));
        Ok(saved.len() < before)
    }

    async fn find_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<Option<SavedJob>> {
        self.check()?;
        Ok(self
            .saved_jobs
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.job_id == job_id)
            .cloned())
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> StoreResult<Vec<SavedJobListing>> {
        self.check()?;
        let jobs = self.jobs.lock().unwrap();
        Ok(self
            .saved_jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter_map(|s| {
                jobs.iter().find(|j| j.id == s.job_id).map(|job| SavedJobListing {
                    saved_at: s.created_at,
                    job: job.clone(),
                })
            })
            .collect())
    }

    async fn count_saved_jobs(&self, user_id: Uuid) -> StoreResult<i64> {
        self.check()?;
        Ok(self
            .saved_jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .count() as i64)
    }
}

#[async_trait]
impl ApplicationStore for MemoryBackend {
    async fn list_applications(
        &self,
        user_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<Application>> {
        self.check()?;
        let mut rows: Vec<Application> = self
            .applications
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id && status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_application(&self, new: NewApplication) -> StoreResult<Application> {
        self.check()?;
        let now = Utc::now();
        let row = Application {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            job_id: new.job_id,
            position: new.position,
            company: new.company,
            status: new.status,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        self.applications.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_application_status(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        self.check()?;
        let mut rows = self.applications.lock().unwrap();
        Ok(rows
            .iter_mut()
            .find(|a| a.id == application_id && a.user_id == user_id)
            .map(|a| {
                a.status = status;
                a.updated_at = Utc::now();
                a.clone()
            }))
    }

    async fn delete_application(&self, user_id: Uuid, application_id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut rows = self.applications.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| !(a.id == application_id && a.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn count_applications(
        &self,
        user_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<i64> {
        self.check()?;
        Ok(self
            .applications
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id && status.map_or(true, |s| a.status == s))
            .count() as i64)
    }
}

#[async_trait]
impl AlertStore for MemoryBackend {
    async fn list_alerts(&self, user_id: Uuid) -> StoreResult<Vec<JobAlert>> {
        self.check()?;
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_alert(&self, user_id: Uuid, alert_id: Uuid) -> StoreResult<Option<JobAlert>> {
        self.check()?;
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == alert_id && a.user_id == user_id)
            .cloned())
    }

    async fn create_alert(&self, new: NewJobAlert) -> StoreResult<JobAlert> {
        self.check()?;
        let row = JobAlert {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            query: new.query,
            keywords: new.keywords,
            location: new.location,
            frequency: new.frequency,
            created_at: Utc::now(),
        };
        self.alerts.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_alert_frequency(
        &self,
        user_id: Uuid,
        alert_id: Uuid,
        frequency: AlertFrequency,
    ) -> StoreResult<Option<JobAlert>> {
        self.check()?;
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.id == alert_id && a.user_id == user_id)
            .map(|a| {
                a.frequency = frequency;
                a.clone()
            }))
    }

    async fn delete_alert(&self, user_id: Uuid, alert_id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut rows = self.alerts.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| !(a.id == alert_id && a.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn count_alerts(&self, user_id: Uuid) -> StoreResult<i64> {
        self.check()?;
        Ok(self
            .alerts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .count() as i64)
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        self.check()?;
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }

    async fn upsert_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> StoreResult<Profile> {
        self.check()?;
        let mut profiles = self.profiles.lock().unwrap();
        let now = Utc::now();
        let index = match profiles.iter().position(|p| p.id == user_id) {
            Some(index) => index,
            None => {
                profiles.push(Profile {
                    id: user_id,
                    email: None,
                    full_name: None,
                    phone: None,
                    location: None,
                    headline: None,
                    skills: vec![],
                    onboarding_step: 0,
                    onboarding_completed: false,
                    created_at: now,
                    updated_at: now,
                });
                profiles.len() - 1
            }
        };
        let profile = &mut profiles[index];
        if let Some(v) = &update.email {
            profile.email = Some(v.clone());
        }
        if let Some(v) = &update.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = &update.phone {
            profile.phone = Some(v.clone());
        }
        if let Some(v) = &update.location {
            profile.location = Some(v.clone());
        }
        if let Some(v) = &update.headline {
            profile.headline = Some(v.clone());
        }
        if let Some(v) = &update.skills {
            profile.skills = v.clone();
        }
        profile.updated_at = now;
        Ok(profile.clone())
    }

    async fn update_onboarding(
        &self,
        user_id: Uuid,
        step: i32,
        completed: bool,
    ) -> StoreResult<Option<Profile>> {
        self.check()?;
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter_mut()
            .find(|p| p.id == user_id)
            .map(|p| {
                p.onboarding_step = step;
                p.onboarding_completed = completed;
                p.updated_at = Utc::now();
                p.clone()
            }))
    }
}

#[async_trait]
impl ResumeStore for MemoryBackend {
    async fn list_resumes(&self, user_id: Uuid) -> StoreResult<Vec<Resume>> {
        self.check()?;
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_resume(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<Option<Resume>> {
        self.check()?;
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == resume_id && r.user_id == user_id)
            .cloned())
    }

    async fn create_resume(&self, new: NewResume) -> StoreResult<Resume> {
        self.check()?;
        let now = Utc::now();
        let row = Resume {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            content: Json(new.content),
            parsed: new.parsed.map(Json),
            file_url: new.file_url,
            tailored_for_job_id: None,
            created_at: now,
            updated_at: now,
        };
        self.resumes.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update_resume(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        update: ResumeUpdate,
    ) -> StoreResult<Option<Resume>> {
        self.check()?;
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.id == resume_id && r.user_id == user_id)
            .map(|r| {
                if let Some(title) = update.title {
                    r.title = title;
                }
                if let Some(content) = update.content {
                    r.content = Json(content);
                }
                if let Some(job_id) = update.tailored_for_job_id {
                    r.tailored_for_job_id = job_id;
                }
                r.updated_at = Utc::now();
                r.clone()
            }))
    }

    async fn delete_resume(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<bool> {
        self.check()?;
        let mut rows = self.resumes.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.id == resume_id && r.user_id == user_id));
        Ok(rows.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_posted_within_days_filters_old_listings() {
        let fresh = sample_job("Rust Engineer", "Ferrous");
        let mut stale = sample_job("Rust Engineer", "Oxide");
        stale.posted_at = Utc::now() - Duration::days(30);
        let backend = MemoryBackend::with_jobs(vec![fresh, stale]);

        let filters = JobSearchFilters {
            posted_within_days: Some(7),
            ..JobSearchFilters::default()
        };
        let page = backend
            .search_jobs(&filters, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.jobs[0].company, "Ferrous");

        let wider = JobSearchFilters {
            posted_within_days: Some(60),
            ..JobSearchFilters::default()
        };
        let page = backend
            .search_jobs(&wider, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_job_type_filter() {
        let mut contract = sample_job("Rust Engineer", "Oxide");
        contract.job_type = JobType::Contract;
        let backend =
            MemoryBackend::with_jobs(vec![sample_job("Rust Engineer", "Ferrous"), contract]);

        let filters = JobSearchFilters {
            job_type: Some(JobType::Contract),
            ..JobSearchFilters::default()
        };
        let page = backend
            .search_jobs(&filters, PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.jobs[0].company, "Oxide");
    }
}
