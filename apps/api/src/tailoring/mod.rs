//! Resume tailoring. Shapes requests for the remote tailoring function and
//! validates what comes back. The rewriting itself happens remotely.

pub mod client;
pub mod service;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::Job;
use crate::models::resume::ResumeContent;
use crate::util::normalize_terms;

pub use client::TailorClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSection {
    Summary,
    Experience,
    Education,
    Skills,
}

impl ResumeSection {
    pub const ALL: [ResumeSection; 4] = [
        ResumeSection::Summary,
        ResumeSection::Experience,
        ResumeSection::Education,
        ResumeSection::Skills,
    ];
}

/// The job a resume is being tailored against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl From<&Job> for JobPosting {
    fn from(job: &Job) -> Self {
        Self {
            title: job.title.clone(),
            company: job.company.clone(),
            description: job.description.clone(),
            requirements: vec![],
        }
    }
}

/// Body sent to the tailoring function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailorRequest {
    pub resume_id: Uuid,
    pub job: JobPosting,
    pub sections: Vec<ResumeSection>,
    pub skills: Vec<String>,
}

impl TailorRequest {
    /// Validates and normalises a tailoring request.
    /// - the posting must have a description
    /// - no sections selected means every section
    /// - sections and skills are de-duplicated, skills trimmed (case-insensitive)
    pub fn new(
        resume_id: Uuid,
        job: JobPosting,
        sections: Vec<ResumeSection>,
        skills: Vec<String>,
    ) -> Result<Self, AppError> {
        if job.description.trim().is_empty() {
            return Err(AppError::Validation(
                "job description cannot be empty".to_string(),
            ));
        }

        let sections = if sections.is_empty() {
            ResumeSection::ALL.to_vec()
        } else {
            let mut seen = HashSet::new();
            sections.into_iter().filter(|s| seen.insert(*s)).collect()
        };

        Ok(Self {
            resume_id,
            job,
            sections,
            skills: normalize_terms(skills),
        })
    }
}

/// Successful tailoring output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResume {
    pub content: ResumeContent,
    /// Match score on a 0–10 scale, when the function reports one.
    pub match_score: Option<f64>,
    #[serde(default)]
    pub changes: Vec<String>,
}

/// Response envelope of the tailoring function.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TailorEnvelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub data: Option<TailoredResume>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TailorEnvelope {
    pub fn into_result(self) -> Result<TailoredResume, TailorError> {
        if let Some(message) = self.error.filter(|m| !m.trim().is_empty()) {
            return Err(TailorError::Rejected(message));
        }
        if self.success == Some(false) {
            return Err(TailorError::Rejected(
                "Tailoring function reported a failure".to_string(),
            ));
        }
        self.data.ok_or(TailorError::MalformedEnvelope)
    }
}

#[derive(Debug, Error)]
pub enum TailorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Function error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("Response envelope has neither data nor error")]
    MalformedEnvelope,
}

impl From<TailorError> for AppError {
    fn from(err: TailorError) -> Self {
        match err {
            TailorError::Rejected(message) => AppError::UnprocessableEntity(message),
            other => AppError::Tailoring(other.to_string()),
        }
    }
}

/// Fixed attempt count with exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
        }
    }

    /// Delay before `attempt` (0-based). Attempt 0 runs immediately,
    /// then 1x, 2x, 4x… the base delay.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.saturating_pow(attempt - 1)
    }
}

/// Anything that can tailor a resume. `AppState` carries an `Arc<dyn Tailor>`.
#[async_trait]
pub trait Tailor: Send + Sync {
    async fn tailor(&self, request: &TailorRequest) -> Result<TailoredResume, TailorError>;
}
