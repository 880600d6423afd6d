//! Liveness scanning.
//!
//! Probes every link of a [`ScanPlan`] one at a time and reports links whose
//! probe returned a server error. The scan owns its [`ScanState`] and talks to
//! the outside world only through the event channel, so it can run in a
//! spawned task while the rest of the engine keeps serving requests.
//!
//! Cancellation is cooperative: the token is checked before each probe and
//! raced against the probe in flight. A probe aborted that way is not counted.
//!
//! The scanner emits progress, findings and cancellation. A completed run is
//! announced by whoever persists it (`App::finish_invalid_scan`), so a
//! `ScanCompleted` listener always finds the run in history.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::types::errors::ProbeError;
use crate::types::scan::{
    AuditEvent, InvalidLink, ScanKind, ScanPhase, ScanPlan, ScanReport, ScanRun,
};

/// Something that can check whether a URL answers.
///
/// Implementations resolve to the HTTP status code of a HEAD request, or a
/// [`ProbeError`] when no status was obtained.
pub trait Probe {
    fn probe(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<u16, ProbeError>> + Send;
}

/// What a single probe outcome means for the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The server answered with a 5xx status.
    Invalid(u16),
    /// Any other status. Redirects, 404s and 403s land here.
    Alive(u16),
    /// No status at all (timeout or network failure). Not reported.
    Unknown,
}

/// Maps a probe outcome to a verdict. Only `[500, 600)` is invalid.
pub fn classify(outcome: &Result<u16, ProbeError>) -> Verdict {
    match outcome {
        Ok(status) if (500..600).contains(status) => Verdict::Invalid(*status),
        Ok(status) => Verdict::Alive(*status),
        Err(_) => Verdict::Unknown,
    }
}

/// Counters owned by a running scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanState {
    pub phase: ScanPhase,
    pub total: u32,
    pub checked: u32,
    pub scanned: u32,
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            phase: ScanPhase::Idle,
            total: 0,
            checked: 0,
            scanned: 0,
        }
    }

    fn begin(&mut self, total: u32) {
        self.phase = ScanPhase::Running;
        self.total = total;
        self.checked = 0;
        self.scanned = 0;
    }

    /// Fraction of links checked so far, `1.0` for an empty scan.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.checked as f64 / self.total as f64
        }
    }

    fn finish(&mut self) {
        self.phase = if self.checked < self.total {
            ScanPhase::Cancelled
        } else {
            ScanPhase::Completed
        };
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequential liveness scanner over a probe implementation.
pub struct LivenessScanner<P: Probe> {
    probe: P,
    events: Option<UnboundedSender<AuditEvent>>,
}

impl<P: Probe> LivenessScanner<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            events: None,
        }
    }

    /// Sends events to `events` while scanning.
    pub fn with_events(mut self, events: UnboundedSender<AuditEvent>) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: AuditEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening anymore.
            let _ = tx.send(event);
        }
    }

    /// Runs the scan to completion or cancellation.
    pub async fn run(&self, plan: ScanPlan, cancel: CancellationToken) -> ScanReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let timeout = Duration::from_millis(plan.timeout_ms);

        let mut state = ScanState::new();
        state.begin(plan.links.len() as u32);
        let mut invalid: Vec<InvalidLink> = Vec::new();

        info!(
            total = state.total,
            empty_folders = plan.empty_folders.len(),
            timeout_ms = plan.timeout_ms,
            "liveness scan started"
        );

        for link in &plan.links {
            if cancel.is_cancelled() {
                break;
            }
            state.scanned += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ProbeError::Aborted),
                result = tokio::time::timeout(timeout, self.probe.probe(&link.url, timeout)) => {
                    match result {
                        Ok(outcome) => outcome,
                        Err(_) => Err(ProbeError::Timeout(link.url.clone())),
                    }
                }
            };

            if outcome == Err(ProbeError::Aborted) {
                debug!(url = %link.url, "probe aborted by cancellation");
                break;
            }

            match classify(&outcome) {
                Verdict::Invalid(status) => {
                    debug!(url = %link.url, status, "server error");
                    let found = InvalidLink {
                        link: link.clone(),
                        status,
                    };
                    invalid.push(found.clone());
                    self.emit(AuditEvent::InvalidFound { link: found });
                }
                Verdict::Alive(status) => debug!(url = %link.url, status, "reachable"),
                Verdict::Unknown => {
                    if let Err(err) = &outcome {
                        debug!(url = %link.url, error = %err, "probe failed, not reported");
                    }
                }
            }

            state.checked += 1;
            self.emit(AuditEvent::Progress {
                checked: state.checked,
                total: state.total,
                fraction: state.fraction(),
            });
        }

        state.finish();
        let duration_seconds = clock.elapsed().as_secs_f64();

        let mut report = ScanReport {
            phase: state.phase,
            started_at,
            scope_folder_ids: plan.scope_folder_ids,
            total: state.total,
            checked: state.checked,
            scanned: state.scanned,
            invalid,
            empty_folders: plan.empty_folders,
            duration_seconds,
            run: None,
        };

        if report.is_cancelled() {
            info!(checked = report.checked, total = report.total, "liveness scan cancelled");
            self.emit(AuditEvent::ScanCancelled {
                checked: report.checked,
                total: report.total,
            });
        } else {
            let run = build_scan_run(&report);
            info!(
                id = %run.id,
                found = run.found_count,
                seconds = duration_seconds,
                "liveness scan completed"
            );
            report.run = Some(run);
        }

        report
    }
}

/// History record for a liveness report.
pub fn build_scan_run(report: &ScanReport) -> ScanRun {
    ScanRun {
        id: uuid::Uuid::new_v4().to_string(),
        started_at: report.started_at,
        kind: ScanKind::Invalid,
        scope_folder_ids: report.scope_folder_ids.clone(),
        scanned_count: report.scanned,
        found_count: report.found_count(),
        cleaned_count: 0,
        duration_seconds: report.duration_seconds,
    }
}
