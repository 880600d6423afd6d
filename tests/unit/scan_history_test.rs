//! Unit tests for the scan history log.

use std::collections::BTreeSet;

use chrono::{TimeZone, Utc};

use bookmark_audit::database::{Database, KeyValueStore, SqliteKvStore};
use bookmark_audit::managers::scan_history::{
    ScanHistory, ScanHistoryTrait, MAX_SCAN_HISTORY, SCAN_HISTORY_KEY,
};
use bookmark_audit::types::errors::HistoryError;
use bookmark_audit::types::scan::{ScanKind, ScanRun};

fn run(id: &str, kind: ScanKind) -> ScanRun {
    ScanRun {
        id: id.to_string(),
        started_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        kind,
        scope_folder_ids: BTreeSet::from(["1".to_string()]),
        scanned_count: 10,
        found_count: 3,
        cleaned_count: 0,
        duration_seconds: 1.5,
    }
}

#[test]
fn test_list_starts_empty() {
    let db = Database::open_in_memory().unwrap();
    let history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    assert!(history.list().unwrap().is_empty());
}

#[test]
fn test_append_keeps_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    history.append(run("first", ScanKind::Invalid)).unwrap();
    history.append(run("second", ScanKind::Duplicate)).unwrap();

    let ids: Vec<String> = history.list().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["second", "first"]);
}

#[test]
fn test_history_is_capped() {
    let db = Database::open_in_memory().unwrap();
    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    for i in 0..MAX_SCAN_HISTORY + 5 {
        history.append(run(&format!("run-{}", i), ScanKind::Invalid)).unwrap();
    }

    let runs = history.list().unwrap();
    assert_eq!(runs.len(), MAX_SCAN_HISTORY);
    assert_eq!(runs[0].id, format!("run-{}", MAX_SCAN_HISTORY + 4));
    assert_eq!(runs[MAX_SCAN_HISTORY - 1].id, "run-5");
}

#[test]
fn test_add_cleaned_accumulates() {
    let db = Database::open_in_memory().unwrap();
    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    history.append(run("r1", ScanKind::Invalid)).unwrap();

    history.add_cleaned("r1", 2).unwrap();
    let updated = history.add_cleaned("r1", 1).unwrap();
    assert_eq!(updated.cleaned_count, 3);
    assert_eq!(history.list().unwrap()[0].cleaned_count, 3);
}

#[test]
fn test_add_cleaned_unknown_run() {
    let db = Database::open_in_memory().unwrap();
    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    assert_eq!(
        history.add_cleaned("missing", 1).unwrap_err(),
        HistoryError::NotFound("missing".to_string())
    );
}

#[test]
fn test_latest_by_kind() {
    let db = Database::open_in_memory().unwrap();
    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    history.append(run("inv-old", ScanKind::Invalid)).unwrap();
    history.append(run("dup", ScanKind::Duplicate)).unwrap();
    history.append(run("inv-new", ScanKind::Invalid)).unwrap();

    assert_eq!(history.latest(ScanKind::Invalid).unwrap().unwrap().id, "inv-new");
    assert_eq!(history.latest(ScanKind::Duplicate).unwrap().unwrap().id, "dup");
}

#[test]
fn test_clear() {
    let db = Database::open_in_memory().unwrap();
    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    history.append(run("r1", ScanKind::Invalid)).unwrap();
    history.clear().unwrap();
    assert!(history.list().unwrap().is_empty());
    assert!(history.latest(ScanKind::Invalid).unwrap().is_none());
}

#[test]
fn test_corrupt_log_reads_as_empty_and_recovers() {
    let db = Database::open_in_memory().unwrap();
    let store = SqliteKvStore::new(db.connection());
    store.set(SCAN_HISTORY_KEY, "{not json").unwrap();

    let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    assert!(history.list().unwrap().is_empty());
    history.append(run("fresh", ScanKind::Duplicate)).unwrap();
    assert_eq!(history.list().unwrap().len(), 1);
}

#[test]
fn test_runs_survive_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("history.db");
    {
        let db = Database::open(&path).unwrap();
        let mut history = ScanHistory::new(SqliteKvStore::new(db.connection()));
        history.append(run("kept", ScanKind::Invalid)).unwrap();
    }
    let db = Database::open(&path).unwrap();
    let history = ScanHistory::new(SqliteKvStore::new(db.connection()));
    assert_eq!(history.list().unwrap(), vec![run("kept", ScanKind::Invalid)]);
}
