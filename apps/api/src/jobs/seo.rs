use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::job::Job;

pub const SITE_NAME: &str = "Jobpilot";
pub const META_DESCRIPTION_MAX: usize = 160;

#[derive(Debug, Clone, Serialize)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub canonical_path: String,
}

impl SeoMeta {
    pub fn for_job(job: &Job) -> Self {
        Self {
            title: page_title(&job.title, &job.company),
            description: meta_description(&job.description, META_DESCRIPTION_MAX),
            canonical_path: canonical_job_path(job),
        }
    }
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex is valid"))
}

pub fn page_title(title: &str, company: &str) -> String {
    format!("{} at {} | {SITE_NAME}", title.trim(), company.trim())
}

/// Plain-text description: tags stripped, whitespace collapsed, cut on a
/// word boundary so the result (ellipsis included) fits `max_len` chars.
pub fn meta_description(text: &str, max_len: usize) -> String {
    let stripped = tag_regex().replace_all(text, " ");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_len {
        return collapsed;
    }

    let budget = max_len.saturating_sub(1);
    let cut: String = collapsed.chars().take(budget).collect();
    let at_boundary = collapsed
        .chars()
        .nth(budget)
        .map_or(true, char::is_whitespace);
    let kept = if at_boundary {
        cut.as_str()
    } else {
        match cut.rfind(' ') {
            Some(idx) if idx > 0 => &cut[..idx],
            _ => cut.as_str(),
        }
    };
    let kept = kept.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-'));
    format!("{kept}…")
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

pub fn canonical_job_path(job: &Job) -> String {
    let slug = slugify(&format!("{} {}", job.title, job.company));
    let id = job.id.simple().to_string();
    format!("/jobs/{slug}-{}", &id[..8])
}
