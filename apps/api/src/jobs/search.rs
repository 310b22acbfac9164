//! Job search filters and page shapes shared by the search endpoint,
//! alert matching and the backends.

use serde::{Deserialize, Serialize};

use crate::models::alert::JobAlert;
use crate::models::job::{Job, JobType};
use crate::util::non_blank;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSearchFilters {
    /// Free text matched against title, company and description.
    pub query: Option<String>,
    /// A job matches when any keyword appears in its title or description.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub remote: Option<bool>,
    pub salary_min: Option<i32>,
    pub posted_within_days: Option<i32>,
}

impl JobSearchFilters {
    /// Filters that reproduce a saved alert's search.
    pub fn from_alert(alert: &JobAlert) -> Self {
        Self {
            query: non_blank(Some(&alert.query)),
            keywords: alert.keywords.clone(),
            location: non_blank(alert.location.as_deref()),
            ..Self::default()
        }
    }

    pub fn query_text(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn location_text(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    pub fn keyword_terms(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
    }
}

/// 1-based page request with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of search results. `next_page` is the cursor for the following
/// page and is present exactly when `has_more` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub has_more: bool,
    pub next_page: Option<u32>,
}

impl JobPage {
    pub fn new(jobs: Vec<Job>, request: PageRequest, total: i64) -> Self {
        let seen = request.offset() + jobs.len() as i64;
        // The last representable page never has a successor.
        let next_page = request.page.checked_add(1).filter(|_| seen < total);
        Self {
            jobs,
            page: request.page,
            page_size: request.page_size,
            total,
            has_more: next_page.is_some(),
            next_page,
        }
    }
}
