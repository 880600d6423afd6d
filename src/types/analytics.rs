use serde::{Deserialize, Serialize};

use super::bookmark::FlatLink;

/// Visit data for one URL from the browsing-history feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitInfo {
    pub visit_count: u32,
    /// Milliseconds since the UNIX epoch.
    pub last_visit_time: i64,
}

/// A bookmark joined with its visit data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEntry {
    pub link: FlatLink,
    pub visit_count: u32,
    pub last_visit_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthGrade {
    Excellent,
    Good,
    Poor,
}

impl HealthGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => HealthGrade::Excellent,
            70..=89 => HealthGrade::Good,
            _ => HealthGrade::Poor,
        }
    }
}

/// Full result of an analytics run.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub score: u8,
    pub grade: HealthGrade,
    pub total: usize,
    pub duplicates: usize,
    pub empty_folders: usize,
    pub invalid: usize,
    pub most_visited: Vec<UsageEntry>,
    pub zombies: Vec<UsageEntry>,
    pub domains: Vec<(String, usize)>,
    pub timeline: Vec<(String, usize)>,
}

/// One analytics snapshot kept for trend comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub total: i64,
    pub invalid: i64,
    pub duplicate: i64,
    pub timestamp: i64,
}

/// Difference between the newest trend point and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendDelta {
    pub total: i64,
    pub invalid: i64,
    pub duplicate: i64,
}
