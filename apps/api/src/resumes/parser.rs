//! Heuristic parsing of extracted resume text: contact details, links,
//! section headings and the skills list.

use std::collections::HashSet;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::models::resume::{ContactInfo, ParsedResume, ResumeContent};

const MAX_SKILLS: usize = 50;

/// Heading text (lower-cased, no trailing colon) → canonical section name.
const SECTION_HEADINGS: &[(&str, &str)] = &[
    ("summary", "summary"),
    ("professional summary", "summary"),
    ("profile", "summary"),
    ("objective", "summary"),
    ("experience", "experience"),
    ("work experience", "experience"),
    ("professional experience", "experience"),
    ("employment history", "experience"),
    ("education", "education"),
    ("skills", "skills"),
    ("technical skills", "skills"),
    ("core competencies", "skills"),
    ("projects", "projects"),
    ("certifications", "certifications"),
];

struct Patterns {
    email: Regex,
    phone: Regex,
    link: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
            .expect("static regex is valid"),
        phone: Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("static regex is valid"),
        link: Regex::new(r"(?:https?://|www\.|linkedin\.com/|github\.com/)[^\s,;|]+")
            .expect("static regex is valid"),
    })
}

fn section_of(line: &str) -> Option<&'static str> {
    let normalized = line.trim().trim_end_matches(':').trim().to_lowercase();
    SECTION_HEADINGS
        .iter()
        .find(|(heading, _)| *heading == normalized)
        .map(|(_, section)| *section)
}

/// First line of the document when it looks like a person's name.
fn guess_full_name(text: &str) -> Option<String> {
    let first = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let words: Vec<&str> = first.split_whitespace().collect();
    let looks_like_name = (2..=4).contains(&words.len())
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'' || c == '.'));
    (looks_like_name && section_of(first).is_none()).then(|| words.join(" "))
}

pub fn parse_resume_text(raw_text: &str) -> ParsedResume {
    let p = patterns();

    let email = p.email.find(raw_text).map(|m| m.as_str().to_string());
    let phone = p
        .phone
        .find(raw_text)
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));

    let mut seen_links = HashSet::new();
    let links = p
        .link
        .find_iter(raw_text)
        .map(|m| m.as_str().trim_end_matches(['.', ')']).to_string())
        .filter(|l| seen_links.insert(l.to_lowercase()))
        .collect();

    let mut sections = Vec::new();
    let mut skills = Vec::new();
    let mut seen_skills = HashSet::new();
    let mut current: Option<&'static str> = None;

    for line in raw_text.lines() {
        if let Some(section) = section_of(line) {
            if !sections.iter().any(|s| s == section) {
                sections.push(section.to_string());
            }
            current = Some(section);
            continue;
        }
        if current != Some("skills") {
            continue;
        }
        for item in line.split([',', ';', '•', '|', '·']) {
            let item = item.trim().trim_start_matches(['-', '*']).trim();
            if item.is_empty() || item.len() > 40 || skills.len() >= MAX_SKILLS {
                continue;
            }
            if seen_skills.insert(item.to_lowercase()) {
                skills.push(item.to_string());
            }
        }
    }

    ParsedResume {
        raw_text: raw_text.to_string(),
        full_name: guess_full_name(raw_text),
        email,
        phone,
        links,
        skills,
        sections,
        parsed_at: Utc::now(),
    }
}

/// Starting resume content pre-filled from a parse.
pub fn content_from_parsed(parsed: &ParsedResume) -> ResumeContent {
    let linkedin = parsed
        .links
        .iter()
        .find(|l| l.to_lowercase().contains("linkedin.com"))
        .cloned();
    let website = parsed
        .links
        .iter()
        .find(|l| !l.to_lowercase().contains("linkedin.com"))
        .cloned();

    ResumeContent {
        contact: ContactInfo {
            full_name: parsed.full_name.clone(),
            email: parsed.email.clone(),
            phone: parsed.phone.clone(),
            location: None,
            linkedin,
            website,
        },
        skills: parsed.skills.clone(),
        ..ResumeContent::default()
    }
}
