//! Tailoring flow: load the resume, resolve the posting, call the function,
//! store the rewritten content.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::resume::{Resume, ResumeUpdate};
use crate::resumes::scoring::ScoreBadge;
use crate::tailoring::{JobPosting, ResumeSection, Tailor, TailorRequest};

#[derive(Debug, Deserialize)]
pub struct TailorResumeBody {
    /// A stored job to tailor against. Takes precedence over `job`.
    pub job_id: Option<Uuid>,
    /// An ad-hoc posting, e.g. pasted from another site.
    pub job: Option<JobPosting>,
    #[serde(default)]
    pub sections: Vec<ResumeSection>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TailorOutcome {
    pub resume: Resume,
    pub score: Option<ScoreBadge>,
    pub changes: Vec<String>,
}

pub async fn tailor_resume(
    backend: &dyn Backend,
    tailor: &dyn Tailor,
    user_id: Uuid,
    resume_id: Uuid,
    body: TailorResumeBody,
) -> Result<TailorOutcome, AppError> {
    let resume = backend
        .get_resume(user_id, resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    let (posting, job_id) = match (body.job_id, body.job) {
        (Some(job_id), _) => {
            let job = backend
                .get_job(job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
            (JobPosting::from(&job), Some(job_id))
        }
        (None, Some(posting)) => (posting, None),
        (None, None) => {
            return Err(AppError::Validation(
                "either job_id or job is required".to_string(),
            ))
        }
    };

    let request = TailorRequest::new(resume.id, posting, body.sections, body.skills)?;
    info!(
        "Tailoring resume {} for '{}' at {} ({} sections)",
        resume.id,
        request.job.title,
        request.job.company,
        request.sections.len()
    );

    let tailored = tailor.tailor(&request).await?;

    let updated = backend
        .update_resume(
            user_id,
            resume.id,
            ResumeUpdate {
                title: None,
                content: Some(tailored.content),
                // Always written: an ad-hoc posting clears a previous job link.
                tailored_for_job_id: Some(job_id),
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;

    Ok(TailorOutcome {
        resume: updated,
        score: tailored.match_score.map(ScoreBadge::from_score),
        changes: tailored.changes,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::backend::memory::{sample_job, MemoryBackend};
    use crate::backend::ResumeStore;
    use crate::models::resume::{NewResume, ResumeContent};
    use crate::tailoring::{TailorError, TailoredResume};

    /// Records requests and answers with a fixed result.
    struct StubTailor {
        requests: Mutex<Vec<TailorRequest>>,
        reject_with: Option<String>,
    }

    impl StubTailor {
        fn accepting() -> Self {
            Self {
                requests: Mutex::new(vec![]),
                reject_with: None,
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                requests: Mutex::new(vec![]),
                reject_with: Some(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl Tailor for StubTailor {
        async fn tailor(&self, request: &TailorRequest) -> Result<TailoredResume, TailorError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(message) = &self.reject_with {
                return Err(TailorError::Rejected(message.clone()));
            }
            Ok(TailoredResume {
                content: ResumeContent {
                    summary: Some(format!("Tailored for {}", request.job.title)),
                    skills: request.skills.clone(),
                    ..ResumeContent::default()
                },
                match_score: Some(8.2),
                changes: vec!["Rewrote summary".to_string()],
            })
        }
    }

    async fn seed_resume(backend: &MemoryBackend, user_id: Uuid) -> Resume {
        backend
            .create_resume(NewResume {
                user_id,
                title: "Main resume".to_string(),
                content: ResumeContent::default(),
                parsed: None,
                file_url: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_tailor_against_stored_job_updates_resume() {
        let job = sample_job("Rust Engineer", "Ferrous");
        let job_id = job.id;
        let backend = MemoryBackend::with_jobs(vec![job]);
        let user_id = Uuid::new_v4();
        let resume = seed_resume(&backend, user_id).await;
        let tailor = StubTailor::accepting();

        let outcome = tailor_resume(
            &backend,
            &tailor,
            user_id,
            resume.id,
            TailorResumeBody {
                job_id: Some(job_id),
                job: None,
                sections: vec![],
                skills: vec!["Rust".to_string()],
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.resume.tailored_for_job_id, Some(job_id));
        assert_eq!(
            outcome.resume.content.0.summary.as_deref(),
            Some("Tailored for Rust Engineer")
        );
        let score = outcome.score.unwrap();
        assert_eq!(score.label, "Good");

        let requests = tailor.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].resume_id, resume.id);
        assert_eq!(requests[0].sections.len(), 4);
    }

    #[tokio::test]
    async fn test_adhoc_posting_clears_previous_job_link() {
        let job = sample_job("Rust Engineer", "Ferrous");
        let job_id = job.id;
        let backend = MemoryBackend::with_jobs(vec![job]);
        let user_id = Uuid::new_v4();
        let resume = seed_resume(&backend, user_id).await;
        let tailor = StubTailor::accepting();

        let first = tailor_resume(
            &backend,
            &tailor,
            user_id,
            resume.id,
            TailorResumeBody {
                job_id: Some(job_id),
                job: None,
                sections: vec![],
                skills: vec![],
            },
        )
        .await
        .unwrap();
        assert_eq!(first.resume.tailored_for_job_id, Some(job_id));

        let second = tailor_resume(
            &backend,
            &tailor,
            user_id,
            resume.id,
            TailorResumeBody {
                job_id: None,
                job: Some(JobPosting {
                    title: "Designer".to_string(),
                    company: "Pixel".to_string(),
                    description: "Design things".to_string(),
                    requirements: vec![],
                }),
                sections: vec![],
                skills: vec![],
            },
        )
        .await
        .unwrap();

        assert_eq!(
            second.resume.content.0.summary.as_deref(),
            Some("Tailored for Designer")
        );
        assert_eq!(second.resume.tailored_for_job_id, None);
    }

    #[tokio::test]
    async fn test_plain_edit_keeps_job_link() {
        let job = sample_job("Rust Engineer", "Ferrous");
        let job_id = job.id;
        let backend = MemoryBackend::with_jobs(vec![job]);
        let user_id = Uuid::new_v4();
        let resume = seed_resume(&backend, user_id).await;

        tailor_resume(
            &backend,
            &StubTailor::accepting(),
            user_id,
            resume.id,
            TailorResumeBody {
                job_id: Some(job_id),
                job: None,
                sections: vec![],
                skills: vec![],
            },
        )
        .await
        .unwrap();

        let edited = backend
            .update_resume(
                user_id,
                resume.id,
                ResumeUpdate {
                    title: Some("Renamed".to_string()),
                    ..ResumeUpdate::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited.title, "Renamed");
        assert_eq!(edited.tailored_for_job_id, Some(job_id));
    }

    #[tokio::test]
    async fn test_other_users_resume_is_not_found() {
        let backend = MemoryBackend::default();
        let resume = seed_resume(&backend, Uuid::new_v4()).await;
        let tailor = StubTailor::accepting();

        let err = tailor_resume(
            &backend,
            &tailor,
            Uuid::new_v4(),
            resume.id,
            TailorResumeBody {
                job_id: None,
                job: Some(JobPosting {
                    title: "Engineer".to_string(),
                    company: "Acme".to_string(),
                    description: "Build".to_string(),
                    requirements: vec![],
                }),
                sections: vec![],
                skills: vec![],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(tailor.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_job_is_validation_error() {
        let backend = MemoryBackend::default();
        let user_id = Uuid::new_v4();
        let resume = seed_resume(&backend, user_id).await;

        let err = tailor_resume(
            &backend,
            &StubTailor::accepting(),
            user_id,
            resume.id,
            TailorResumeBody {
                job_id: None,
                job: None,
                sections: vec![],
                skills: vec![],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_rejection_leaves_resume_untouched() {
        let backend = MemoryBackend::default();
        let user_id = Uuid::new_v4();
        let resume = seed_resume(&backend, user_id).await;

        let err = tailor_resume(
            &backend,
            &StubTailor::rejecting("Daily tailoring limit reached"),
            user_id,
            resume.id,
            TailorResumeBody {
                job_id: None,
                job: Some(JobPosting {
                    title: "Engineer".to_string(),
                    company: "Acme".to_string(),
                    description: "Build".to_string(),
                    requirements: vec![],
                }),
                sections: vec![ResumeSection::Summary],
                skills: vec![],
            },
        )
        .await
        .unwrap_err();

        assert!(
            matches!(err, AppError::UnprocessableEntity(msg) if msg == "Daily tailoring limit reached")
        );
        let stored = backend.get_resume(user_id, resume.id).await.unwrap().unwrap();
        assert_eq!(stored.content.0, ResumeContent::default());
        assert_eq!(stored.tailored_for_job_id, None);
    }
}
