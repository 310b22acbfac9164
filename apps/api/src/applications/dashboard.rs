//! Dashboard counters. Every figure is a count-only query; no rows are loaded.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::application::ApplicationStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_applications: i64,
    /// One entry per status, in `ApplicationStatus::ALL` order, zeros included.
    pub by_status: Vec<StatusCount>,
    pub saved_jobs: i64,
    pub job_alerts: i64,
}

pub async fn load_dashboard_stats(
    backend: &dyn Backend,
    user_id: Uuid,
) -> Result<DashboardStats, AppError> {
    let (total_applications, saved_jobs, job_alerts) = tokio::try_join!(
        backend.count_applications(user_id, None),
        backend.count_saved_jobs(user_id),
        backend.count_alerts(user_id),
    )?;

    let mut by_status = Vec::with_capacity(ApplicationStatus::ALL.len());
    for status in ApplicationStatus::ALL {
        by_status.push(StatusCount {
            status,
            label: status.label(),
            count: backend.count_applications(user_id, Some(status)).await?,
        });
    }

    Ok(DashboardStats {
        total_applications,
        by_status,
        saved_jobs,
        job_alerts,
    })
}
