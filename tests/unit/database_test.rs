//! Unit tests for the database layer (connection + migrations + key-value store).

use bookmark_audit::database::migrations::{
    get_schema_version, CURRENT_SCHEMA_VERSION, OTHER_BOOKMARKS_ID, ROOT_ID,
};
use bookmark_audit::database::{Database, KeyValueStore, SqliteKvStore};

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in &["bookmark_nodes", "kv_store", "visits", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for index in &[
        "idx_bookmark_nodes_parent",
        "idx_bookmark_nodes_title",
        "idx_visits_last_visit",
    ] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Index '{}' should exist after migrations", index);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopen_does_not_duplicate_seed_rows() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("audit.db");
    {
        let _db = Database::open(&path).unwrap();
    }
    let db = Database::open(&path).unwrap();
    let count: i64 = db
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM bookmark_nodes WHERE parent_id = ?1",
            [ROOT_ID],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 2);

    let other: String = db
        .connection()
        .query_row(
            "SELECT title FROM bookmark_nodes WHERE id = ?1",
            [OTHER_BOOKMARKS_ID],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(other, "Other Bookmarks");
}

#[test]
fn test_kv_store_persists_across_connections() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("audit.db");
    {
        let db = Database::open(&path).unwrap();
        SqliteKvStore::new(db.connection())
            .set("scanTimeoutMs", "20000")
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    let store = SqliteKvStore::new(db.connection());
    assert_eq!(store.get("scanTimeoutMs").unwrap().as_deref(), Some("20000"));
}
