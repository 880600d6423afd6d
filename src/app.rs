//! App Core for the bookmark auditor.
//!
//! Central struct owning the database and the event channel. Managers and
//! engines borrow the connection with a lifetime, so they are created on demand
//! from `db.connection()` rather than stored.
//!
//! A liveness scan is split in three steps so the probing future never holds
//! the connection: [`App::prepare_invalid_scan`] builds an owned plan, the
//! scanner runs it, and [`App::finish_invalid_scan`] records the result.

use std::collections::BTreeSet;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::database::{Database, SqliteKvStore};
use crate::managers::bookmark_store::{BookmarkProvider, SqliteBookmarkProvider};
use crate::managers::recycle_manager::{RecycleManager, RecycleManagerTrait};
use crate::managers::scan_history::{ScanHistory, ScanHistoryTrait};
use crate::managers::trend_history::TrendHistory;
use crate::managers::visit_history::{VisitHistory, VisitSource};
use crate::services::duplicate_grouper::{duplicate_excess, group_duplicates, smart_select};
use crate::services::health_analyzer::{analyze, AnalysisInput};
use crate::services::liveness_scanner::{LivenessScanner, Probe};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::tree_flattener::{
    flatten_empty_folders, flatten_links, select_scope, without_subtree,
};
use crate::types::analytics::{HealthReport, TrendDelta, TrendPoint};
use crate::types::bookmark::{BookmarkNode, DuplicateGroup};
use crate::types::errors::{
    AnalyticsError, HistoryError, ProviderError, RecycleError, ScanError, SettingsError,
};
use crate::types::recycle::RecycledItem;
use crate::types::scan::{AuditEvent, ScanKind, ScanPlan, ScanReport, ScanRun};
use crate::types::settings::AuditSettings;

/// Result of a duplicate scan.
#[derive(Debug, Clone)]
pub struct DuplicateScan {
    pub groups: Vec<DuplicateGroup>,
    pub run: ScanRun,
}

/// Result of an analytics run.
#[derive(Debug, Clone)]
pub struct AnalyticsOutcome {
    pub report: HealthReport,
    /// Change since the previous analytics run, if there was one.
    pub delta: Option<TrendDelta>,
}

/// Central application struct.
pub struct App {
    pub db: Database,
    ui_language: String,
    events: Option<UnboundedSender<AuditEvent>>,
}

impl App {
    /// Opens the database at `db_path`, creating and migrating it as needed.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open(db_path)?;
        Ok(Self::with_database(db))
    }

    /// App over an in-memory database.
    pub fn in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::with_database(Database::open_in_memory()?))
    }

    pub fn with_database(db: Database) -> Self {
        Self {
            db,
            ui_language: String::from("en-US"),
            events: None,
        }
    }

    /// Sets the UI locale used to pick the default language.
    pub fn set_ui_language(&mut self, tag: &str) {
        self.ui_language = tag.to_string();
    }

    /// Routes engine events to `events`.
    pub fn set_event_sender(&mut self, events: UnboundedSender<AuditEvent>) {
        self.events = Some(events);
    }

    pub fn event_sender(&self) -> Option<UnboundedSender<AuditEvent>> {
        self.events.clone()
    }

    fn emit(&self, event: AuditEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    // ─── Collaborators ───

    pub fn provider(&self) -> SqliteBookmarkProvider<'_> {
        SqliteBookmarkProvider::new(self.db.connection())
    }

    /// Settings engine with stored values loaded.
    pub fn settings_engine(&self) -> Result<SettingsEngine<SqliteKvStore<'_>>, SettingsError> {
        let mut engine = SettingsEngine::new(SqliteKvStore::new(self.db.connection()))
            .with_ui_language(&self.ui_language);
        engine.load()?;
        Ok(engine)
    }

    pub fn settings(&self) -> Result<AuditSettings, SettingsError> {
        Ok(self.settings_engine()?.get_settings().clone())
    }

    pub fn recycle_manager(
        &self,
    ) -> Result<RecycleManager<SqliteBookmarkProvider<'_>, SqliteKvStore<'_>>, SettingsError> {
        let language = self.settings()?.language;
        Ok(RecycleManager::new(
            self.provider(),
            SqliteKvStore::new(self.db.connection()),
            language,
        ))
    }

    pub fn scan_history(&self) -> ScanHistory<SqliteKvStore<'_>> {
        ScanHistory::new(SqliteKvStore::new(self.db.connection()))
    }

    pub fn trend_history(&self) -> TrendHistory<SqliteKvStore<'_>> {
        TrendHistory::new(SqliteKvStore::new(self.db.connection()))
    }

    pub fn visit_history(&self) -> VisitHistory<'_> {
        VisitHistory::new(self.db.connection())
    }

    // ─── Tree ───

    /// The bookmark tree with the recycle container left out.
    pub fn audit_tree(&self) -> Result<Vec<BookmarkNode>, ProviderError> {
        let tree = self.provider().get_tree()?;
        let container = self
            .recycle_manager()
            .ok()
            .and_then(|mgr| mgr.find_container().ok().flatten());
        Ok(match container {
            Some(container) => without_subtree(&tree, &container.id),
            None => tree,
        })
    }

    /// Top-level folders a scan can be scoped to.
    pub fn scope_folders(&self) -> Result<Vec<BookmarkNode>, ProviderError> {
        let provider = self.provider();
        provider.get_children(provider.root_id())
    }

    fn scoped_nodes(&self, scope: &BTreeSet<String>) -> Result<Vec<BookmarkNode>, ScanError> {
        let tree = self.audit_tree()?;
        select_scope(&tree, scope)
    }

    // ─── Liveness scan ───

    /// Snapshots the scope and settings into an owned plan.
    ///
    /// # Errors
    /// `ScanError::EmptyScope` when `scope` is empty.
    pub fn prepare_invalid_scan(&self, scope: &BTreeSet<String>) -> Result<ScanPlan, ScanError> {
        let selected = self.scoped_nodes(scope)?;
        let settings = self.settings()?;
        let plan = ScanPlan {
            scope_folder_ids: scope.clone(),
            links: flatten_links(&selected, &[]),
            empty_folders: flatten_empty_folders(&selected, &[]),
            timeout_ms: settings.scan_timeout_ms,
        };
        info!(
            links = plan.links.len(),
            empty_folders = plan.empty_folders.len(),
            "prepared liveness scan"
        );
        Ok(plan)
    }

    /// Appends the report's run to history when the scan completed, then
    /// emits `ScanCompleted`.
    pub fn finish_invalid_scan(&self, report: &ScanReport) -> Result<Option<ScanRun>, HistoryError> {
        match &report.run {
            Some(run) => {
                self.scan_history().append(run.clone())?;
                self.emit(AuditEvent::ScanCompleted { run: run.clone() });
                Ok(Some(run.clone()))
            }
            None => Ok(None),
        }
    }

    /// Prepares, runs and finishes a liveness scan in one go.
    pub async fn run_invalid_scan<P: Probe>(
        &self,
        scope: &BTreeSet<String>,
        probe: P,
        cancel: CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let plan = self.prepare_invalid_scan(scope)?;
        let mut scanner = LivenessScanner::new(probe);
        if let Some(tx) = self.event_sender() {
            scanner = scanner.with_events(tx);
        }
        let report = scanner.run(plan, cancel).await;
        self.finish_invalid_scan(&report)?;
        Ok(report)
    }

    // ─── Duplicate scan ───

    /// Groups duplicates in scope and records the run.
    pub fn run_duplicate_scan(&self, scope: &BTreeSet<String>) -> Result<DuplicateScan, ScanError> {
        let started_at = Utc::now();
        let clock = std::time::Instant::now();
        let selected = self.scoped_nodes(scope)?;
        let mode = self.settings()?.normalize_mode;

        let links = flatten_links(&selected, &[]);
        let groups = group_duplicates(&links, mode);
        let run = ScanRun {
            id: uuid::Uuid::new_v4().to_string(),
            started_at,
            kind: ScanKind::Duplicate,
            scope_folder_ids: scope.clone(),
            scanned_count: links.len() as u32,
            found_count: duplicate_excess(&groups) as u32,
            cleaned_count: 0,
            duration_seconds: clock.elapsed().as_secs_f64(),
        };
        self.scan_history().append(run.clone())?;
        info!(id = %run.id, groups = groups.len(), found = run.found_count, "duplicate scan completed");
        self.emit(AuditEvent::ScanCompleted { run: run.clone() });
        Ok(DuplicateScan { groups, run })
    }

    /// IDs to remove so each group keeps its oldest bookmark.
    pub fn smart_select(&self, groups: &[DuplicateGroup]) -> Vec<String> {
        smart_select(groups)
    }

    // ─── Recycle bin ───

    /// Soft-deletes `ids`. When `run_id` names a scan, its cleaned count grows
    /// by the number of items moved.
    pub fn soft_delete(&self, ids: &[String], run_id: Option<&str>) -> Result<usize, RecycleError> {
        let moved = self.recycle_manager()?.soft_delete(ids)?;
        if let Some(run_id) = run_id.filter(|_| moved > 0) {
            if let Err(e) = self.scan_history().add_cleaned(run_id, moved as u32) {
                warn!(run_id, error = %e, "could not update cleaned count");
            }
        }
        self.emit(AuditEvent::ItemsSoftDeleted { count: moved });
        Ok(moved)
    }

    pub fn restore(&self, ids: &[String]) -> Result<usize, RecycleError> {
        let restored = self.recycle_manager()?.restore(ids)?;
        self.emit(AuditEvent::ItemsRestored { count: restored });
        Ok(restored)
    }

    pub fn empty_recycle_bin(&self, confirmed: bool) -> Result<usize, RecycleError> {
        self.recycle_manager()?.empty_recycle_bin(confirmed)
    }

    pub fn list_recycled(&self) -> Result<Vec<RecycledItem>, RecycleError> {
        let mut mgr = self.recycle_manager()?;
        let pruned = mgr.prune_orphans()?;
        if pruned > 0 {
            info!(pruned, "dropped restore records for missing nodes");
        }
        mgr.list_recycled()
    }

    // ─── Analytics ───

    /// Analyzes the whole collection and records a trend point.
    pub fn run_analytics(&self, now_ms: i64) -> Result<AnalyticsOutcome, AnalyticsError> {
        let tree = self.audit_tree()?;
        let links = flatten_links(&tree, &[]);
        let empty_folders = flatten_empty_folders(&tree, &[]).len();
        let history = self.scan_history().list()?;
        let visits = self.visit_history().visit_map()?;
        let settings = self.settings()?;

        let report = analyze(&AnalysisInput {
            links: &links,
            empty_folders,
            history: &history,
            visits: visits.as_ref(),
            normalize_mode: settings.normalize_mode,
            now_ms,
        });

        let delta = self.trend_history().record(TrendPoint {
            total: report.total as i64,
            invalid: report.invalid as i64,
            duplicate: report.duplicates as i64,
            timestamp: now_ms,
        })?;
        info!(score = report.score, total = report.total, "analytics finished");
        Ok(AnalyticsOutcome { report, delta })
    }
}
