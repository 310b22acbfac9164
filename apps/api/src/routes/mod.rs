pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::alerts::handlers as alerts;
use crate::applications::handlers as applications;
use crate::jobs::handlers as jobs;
use crate::profile::handlers as profile;
use crate::resumes::handlers as resumes;
use crate::resumes::upload::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Multipart framing on top of the file itself.
const UPLOAD_BODY_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs
        .route("/api/v1/jobs", get(jobs::handle_search_jobs))
        .route("/api/v1/jobs/saved", get(jobs::handle_list_saved_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:id/save",
            get(jobs::handle_saved_status)
                .post(jobs::handle_save_job)
                .delete(jobs::handle_unsave_job),
        )
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_create_application),
        )
        .route(
            "/api/v1/applications/:id",
            patch(applications::handle_update_application)
                .delete(applications::handle_delete_application),
        )
        .route(
            "/api/v1/dashboard/stats",
            get(applications::handle_dashboard_stats),
        )
        // Alerts
        .route(
            "/api/v1/alerts",
            get(alerts::handle_list_alerts).post(alerts::handle_create_alert),
        )
        .route(
            "/api/v1/alerts/:id",
            patch(alerts::handle_update_alert).delete(alerts::handle_delete_alert),
        )
        .route(
            "/api/v1/alerts/:id/matches",
            get(alerts::handle_alert_matches),
        )
        // Profile
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_upsert_profile),
        )
        .route(
            "/api/v1/profile/onboarding",
            patch(profile::handle_update_onboarding),
        )
        // Resumes
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes).post(resumes::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/upload",
            post(resumes::handle_upload_resume)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + UPLOAD_BODY_OVERHEAD)),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/tailor",
            post(resumes::handle_tailor_resume),
        )
        .with_state(state)
}
