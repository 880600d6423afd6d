//! Scan history log.
//!
//! Completed scans are kept newest first under [`SCAN_HISTORY_KEY`], capped at
//! [`MAX_SCAN_HISTORY`] entries.

use tracing::warn;

use crate::database::KeyValueStore;
use crate::types::errors::{HistoryError, StoreError};
use crate::types::scan::{ScanKind, ScanRun};

pub const SCAN_HISTORY_KEY: &str = "scanHistory";
pub const MAX_SCAN_HISTORY: usize = 50;

/// Trait defining scan history operations.
pub trait ScanHistoryTrait {
    fn list(&self) -> Result<Vec<ScanRun>, HistoryError>;
    fn append(&mut self, run: ScanRun) -> Result<(), HistoryError>;
    fn add_cleaned(&mut self, run_id: &str, count: u32) -> Result<ScanRun, HistoryError>;
    fn latest(&self, kind: ScanKind) -> Result<Option<ScanRun>, HistoryError>;
    fn clear(&mut self) -> Result<(), HistoryError>;
}

/// Scan history persisted through a key-value store.
pub struct ScanHistory<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ScanHistory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn save(&self, runs: &[ScanRun]) -> Result<(), HistoryError> {
        self.store.set_json(SCAN_HISTORY_KEY, &runs)?;
        Ok(())
    }
}

impl<S: KeyValueStore> ScanHistoryTrait for ScanHistory<S> {
    /// All runs, newest first. An unreadable log reads as empty.
    fn list(&self) -> Result<Vec<ScanRun>, HistoryError> {
        match self.store.get_json::<Vec<ScanRun>>(SCAN_HISTORY_KEY) {
            Ok(runs) => Ok(runs.unwrap_or_default()),
            Err(StoreError::SerializationError(msg)) => {
                warn!(error = %msg, "scan history unreadable, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn append(&mut self, run: ScanRun) -> Result<(), HistoryError> {
        let mut runs = self.list()?;
        runs.insert(0, run);
        runs.truncate(MAX_SCAN_HISTORY);
        self.save(&runs)
    }

    /// Adds `count` to the run's `cleaned_count` and returns the updated run.
    fn add_cleaned(&mut self, run_id: &str, count: u32) -> Result<ScanRun, HistoryError> {
        let mut runs = self.list()?;
        let run = runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or_else(|| HistoryError::NotFound(run_id.to_string()))?;
        run.cleaned_count = run.cleaned_count.saturating_add(count);
        let updated = run.clone();
        self.save(&runs)?;
        Ok(updated)
    }

    fn latest(&self, kind: ScanKind) -> Result<Option<ScanRun>, HistoryError> {
        Ok(self.list()?.into_iter().find(|run| run.kind == kind))
    }

    fn clear(&mut self) -> Result<(), HistoryError> {
        self.store.remove(SCAN_HISTORY_KEY)?;
        Ok(())
    }
}
