//! Score presentation: maps a 0–10 score onto a label, a colour class and a
//! gauge gradient stop using fixed thresholds.

use serde::Serialize;

pub const FAIR_THRESHOLD: f64 = 5.0;
pub const GOOD_THRESHOLD: f64 = 7.0;

pub fn get_score_label(score: f64) -> &'static str {
    if score < FAIR_THRESHOLD {
        "Poor"
    } else if score < GOOD_THRESHOLD {
        "Fair"
    } else {
        "Good"
    }
}

pub fn get_score_color(score: f64) -> &'static str {
    if score < FAIR_THRESHOLD {
        "text-red-500"
    } else if score < GOOD_THRESHOLD {
        "text-yellow-500"
    } else {
        "text-green-500"
    }
}

/// Hex colour for the gauge's gradient stop.
pub fn get_score_gradient(score: f64) -> &'static str {
    if score < FAIR_THRESHOLD {
        "#ef4444"
    } else if score < GOOD_THRESHOLD {
        "#eab308"
    } else {
        "#22c55e"
    }
}

/// How full the gauge is, 0–100.
pub fn gauge_percent(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    (score * 10.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBadge {
    pub score: f64,
    pub label: &'static str,
    pub color_class: &'static str,
    pub gradient_stop: String,
    pub percent: u8,
}

impl ScoreBadge {
    pub fn from_score(score: f64) -> Self {
        let percent = gauge_percent(score);
        Self {
            score,
            label: get_score_label(score),
            color_class: get_score_color(score),
            gradient_stop: format!("{} {}%", get_score_gradient(score), percent),
            percent,
        }
    }
}
