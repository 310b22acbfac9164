use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFrequency {
    Instant,
    #[default]
    Daily,
    Weekly,
}

impl AlertFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFrequency::Instant => "instant",
            AlertFrequency::Daily => "daily",
            AlertFrequency::Weekly => "weekly",
        }
    }
}

impl FromStr for AlertFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instant" => Ok(AlertFrequency::Instant),
            "daily" => Ok(AlertFrequency::Daily),
            "weekly" => Ok(AlertFrequency::Weekly),
            other => Err(format!("unknown alert frequency '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub query: String,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub frequency: AlertFrequency,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJobAlert {
    pub user_id: Uuid,
    pub query: String,
    pub keywords: Vec<String>,
    pub location: Option<String>,
    pub frequency: AlertFrequency,
}
