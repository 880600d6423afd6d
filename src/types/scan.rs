use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bookmark::{EmptyFolder, FlatLink};

/// Kind of audit a [`ScanRun`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanKind {
    Invalid,
    Duplicate,
}

/// A completed scan, as kept in the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRun {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub kind: ScanKind,
    pub scope_folder_ids: BTreeSet<String>,
    pub scanned_count: u32,
    pub found_count: u32,
    pub cleaned_count: u32,
    pub duration_seconds: f64,
}

/// Lifecycle of a liveness scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// A link whose probe returned a server error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidLink {
    pub link: FlatLink,
    pub status: u16,
}

impl InvalidLink {
    /// Canonical reason phrase for the status, or a generic label.
    pub fn reason(&self) -> String {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error: {}", self.status))
    }
}

/// Everything a liveness scan needs, captured once at scan start.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub scope_folder_ids: BTreeSet<String>,
    pub links: Vec<FlatLink>,
    pub empty_folders: Vec<EmptyFolder>,
    pub timeout_ms: u64,
}

/// Outcome of a liveness scan, complete or cancelled.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub phase: ScanPhase,
    pub started_at: DateTime<Utc>,
    pub scope_folder_ids: BTreeSet<String>,
    pub total: u32,
    pub checked: u32,
    pub scanned: u32,
    pub invalid: Vec<InvalidLink>,
    pub empty_folders: Vec<EmptyFolder>,
    pub duration_seconds: f64,
    /// History record; present only when the scan completed.
    pub run: Option<ScanRun>,
}

impl ScanReport {
    /// Invalid links plus empty folders.
    pub fn found_count(&self) -> u32 {
        (self.invalid.len() + self.empty_folders.len()) as u32
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == ScanPhase::Cancelled
    }
}

/// Events produced for whatever UI subscribes to the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    Progress { checked: u32, total: u32, fraction: f64 },
    InvalidFound { link: InvalidLink },
    /// Sent once the run has been appended to history.
    ScanCompleted { run: ScanRun },
    ScanCancelled { checked: u32, total: u32 },
    ItemsSoftDeleted { count: usize },
    ItemsRestored { count: usize },
}
