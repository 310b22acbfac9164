use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::backend::{
    AlertStore, ApplicationStore, JobStore, ProfileStore, ResumeStore, SavedJobStore, StoreError,
    StoreResult,
};
use crate::jobs::search::{JobPage, JobSearchFilters, PageRequest};
use crate::models::alert::{AlertFrequency, JobAlert, NewJobAlert};
use crate::models::application::{Application, ApplicationStatus, NewApplication};
use crate::models::job::{Job, SavedJob, SavedJobListing};
use crate::models::profile::{Profile, ProfileUpdate};
use crate::models::resume::{NewResume, Resume, ResumeUpdate};

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) => StoreError::Backend(db_err.message().to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Row types for tables whose enums are stored as text
// ────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
struct ApplicationRow {
    id: Uuid,
    user_id: Uuid,
    job_id: Option<Uuid>,
    position: String,
    company: String,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = StoreError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Application {
            id: row.id,
            user_id: row.user_id,
            job_id: row.job_id,
            position: row.position,
            company: row.company,
            status: row.status.parse().map_err(StoreError::Backend)?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AlertRow {
    id: Uuid,
    user_id: Uuid,
    query: String,
    keywords: Vec<String>,
    location: Option<String>,
    frequency: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for JobAlert {
    type Error = StoreError;

    fn try_from(row: AlertRow) -> Result<Self, Self::Error> {
        Ok(JobAlert {
            id: row.id,
            user_id: row.user_id,
            query: row.query,
            keywords: row.keywords,
            location: row.location,
            frequency: row.frequency.parse().map_err(StoreError::Backend)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    company: String,
    location: Option<String>,
    description: String,
    job_type: String,
    remote: bool,
    salary_min: Option<i32>,
    salary_max: Option<i32>,
    apply_url: Option<String>,
    posted_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            title: row.title,
            company: row.company,
            location: row.location,
            description: row.description,
            job_type: row.job_type.parse().map_err(StoreError::Backend)?,
            remote: row.remote,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            apply_url: row.apply_url,
            posted_at: row.posted_at,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SavedJobRow {
    saved_at: DateTime<Utc>,
    #[sqlx(flatten)]
    job: JobRow,
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// Escapes LIKE metacharacters and wraps the term for a substring match.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn push_job_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &JobSearchFilters) {
    if let Some(query) = filters.query_text() {
        let pattern = like_pattern(query);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    let keywords: Vec<String> = filters.keyword_terms().map(like_pattern).collect();
    if !keywords.is_empty() {
        qb.push(" AND (title ILIKE ANY(")
            .push_bind(keywords.clone())
            .push(") OR description ILIKE ANY(")
            .push_bind(keywords)
            .push("))");
    }

    if let Some(location) = filters.location_text() {
        qb.push(" AND location ILIKE ")
            .push_bind(like_pattern(location));
    }
    if let Some(job_type) = filters.job_type {
        qb.push(" AND job_type = ").push_bind(job_type.as_str());
    }
    if let Some(remote) = filters.remote {
        qb.push(" AND remote = ").push_bind(remote);
    }
    if let Some(salary_min) = filters.salary_min {
        qb.push(" AND (salary_max IS NULL OR salary_max >= ")
            .push_bind(salary_min)
            .push(")");
    }
    if let Some(days) = filters.posted_within_days {
        qb.push(" AND posted_at >= now() - make_interval(days => ")
            .push_bind(days)
            .push(")");
    }
}

#[async_trait]
impl JobStore for PgBackend {
    async fn search_jobs(
        &self,
        filters: &JobSearchFilters,
        page: PageRequest,
    ) -> StoreResult<JobPage> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM jobs WHERE TRUE");
        push_job_filters(&mut count_qb, filters);
        let (total,): (i64,) = count_qb.build_query_as().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs WHERE TRUE");
        push_job_filters(&mut qb, filters);
        qb.push(" ORDER BY posted_at DESC, id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows: Vec<JobRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let jobs = rows
            .into_iter()
            .map(Job::try_from)
            .collect::<StoreResult<Vec<Job>>>()?;

        debug!(
            "Job search page {} returned {} of {} rows",
            page.page,
            jobs.len(),
            total
        );
        Ok(JobPage::new(jobs, page, total))
    }

    async fn get_job(&self, job_id: Uuid) -> StoreResult<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Job::try_from).transpose()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Saved jobs
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl SavedJobStore for PgBackend {
    async fn insert_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<SavedJob> {
        Ok(sqlx::query_as::<_, SavedJob>(
            "INSERT INTO saved_jobs (id, user_id, job_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE user_id = $1 AND job_id = $2")
            .bind(user_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_saved_job(&self, user_id: Uuid, job_id: Uuid) -> StoreResult<Option<SavedJob>> {
        Ok(sqlx::query_as::<_, SavedJob>(
            "SELECT * FROM saved_jobs WHERE user_id = $1 AND job_id = $2",
        )
        .bind(user_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_saved_jobs(&self, user_id: Uuid) -> StoreResult<Vec<SavedJobListing>> {
        let rows = sqlx::query_as::<_, SavedJobRow>(
            r#"
            SELECT s.created_at AS saved_at, j.*
            FROM saved_jobs s
            JOIN jobs j ON j.id = s.job_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(SavedJobListing {
                    saved_at: row.saved_at,
                    job: Job::try_from(row.job)?,
                })
            })
            .collect()
    }

    async fn count_saved_jobs(&self, user_id: Uuid) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM saved_jobs WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Applications
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ApplicationStore for PgBackend {
    async fn list_applications(
        &self,
        user_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<Application>> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT * FROM applications
            WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Application::try_from).collect()
    }

    async fn create_application(&self, new: NewApplication) -> StoreResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (id, user_id, job_id, position, company, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.job_id)
        .bind(&new.position)
        .bind(&new.company)
        .bind(new.status.as_str())
        .bind(&new.notes)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_application_status(
        &self,
        user_id: Uuid,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications SET status = $3, updated_at = now()
            WHERE id = $2 AND user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(application_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Application::try_from).transpose()
    }

    async fn delete_application(&self, user_id: Uuid, application_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(application_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_applications(
        &self,
        user_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM applications WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)",
        )
        .bind(user_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job alerts
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl AlertStore for PgBackend {
    async fn list_alerts(&self, user_id: Uuid) -> StoreResult<Vec<JobAlert>> {
        let rows = sqlx::query_as::<_, AlertRow>(
            "SELECT * FROM job_alerts WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(JobAlert::try_from).collect()
    }

    async fn get_alert(&self, user_id: Uuid, alert_id: Uuid) -> StoreResult<Option<JobAlert>> {
        let row = sqlx::query_as::<_, AlertRow>(
            "SELECT * FROM job_alerts WHERE id = $2 AND user_id = $1",
        )
        .bind(user_id)
        .bind(alert_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobAlert::try_from).transpose()
    }

    async fn create_alert(&self, new: NewJobAlert) -> StoreResult<JobAlert> {
        let row = sqlx::query_as::<_, AlertRow>(
            r#"
            INSERT INTO job_alerts (id, user_id, query, keywords, location, frequency)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.query)
        .bind(&new.keywords)
        .bind(&new.location)
        .bind(new.frequency.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_alert_frequency(
        &self,
        user_id: Uuid,
        alert_id: Uuid,
        frequency: AlertFrequency,
    ) -> StoreResult<Option<JobAlert>> {
        let row = sqlx::query_as::<_, AlertRow>(
            "UPDATE job_alerts SET frequency = $3 WHERE id = $2 AND user_id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(alert_id)
        .bind(frequency.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(JobAlert::try_from).transpose()
    }

    async fn delete_alert(&self, user_id: Uuid, alert_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM job_alerts WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(alert_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_alerts(&self, user_id: Uuid) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM job_alerts WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ProfileStore for PgBackend {
    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_profile(&self, user_id: Uuid, update: &ProfileUpdate) -> StoreResult<Profile> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, full_name, phone, location, headline, skills)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7::text[], '{}'))
            ON CONFLICT (id) DO UPDATE SET
                email      = COALESCE($2, profiles.email),
                full_name  = COALESCE($3, profiles.full_name),
                phone      = COALESCE($4, profiles.phone),
                location   = COALESCE($5, profiles.location),
                headline   = COALESCE($6, profiles.headline),
                skills     = COALESCE($7::text[], profiles.skills),
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&update.email)
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.location)
        .bind(&update.headline)
        .bind(&update.skills)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_onboarding(
        &self,
        user_id: Uuid,
        step: i32,
        completed: bool,
    ) -> StoreResult<Option<Profile>> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET onboarding_step = $2, onboarding_completed = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(step)
        .bind(completed)
        .fetch_optional(&self.pool)
        .await?)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ResumeStore for PgBackend {
    async fn list_resumes(&self, user_id: Uuid) -> StoreResult<Vec<Resume>> {
        Ok(sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_resume(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<Option<Resume>> {
        Ok(
            sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $2 AND user_id = $1")
                .bind(user_id)
                .bind(resume_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn create_resume(&self, new: NewResume) -> StoreResult<Resume> {
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            INSERT INTO resumes (id, user_id, title, content, parsed, file_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.title)
        .bind(Json(new.content))
        .bind(new.parsed.map(Json))
        .bind(&new.file_url)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_resume(
        &self,
        user_id: Uuid,
        resume_id: Uuid,
        update: ResumeUpdate,
    ) -> StoreResult<Option<Resume>> {
        Ok(sqlx::query_as::<_, Resume>(
            r#"
            UPDATE resumes SET
                title               = COALESCE($3, title),
                content             = COALESCE($4, content),
                tailored_for_job_id = CASE WHEN $5 THEN $6 ELSE tailored_for_job_id END,
                updated_at          = now()
            WHERE id = $2 AND user_id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(resume_id)
        .bind(update.title)
        .bind(update.content.map(Json))
        .bind(update.tailored_for_job_id.is_some())
        .bind(update.tailored_for_job_id.flatten())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_resume(&self, user_id: Uuid, resume_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $2 AND user_id = $1")
            .bind(user_id)
            .bind(resume_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
