//! Schema migrations for the auditor's SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// ID of the invisible root node.
pub const ROOT_ID: &str = "0";
/// ID of the "Bookmarks Bar" top-level folder.
pub const BOOKMARKS_BAR_ID: &str = "1";
/// ID of the "Other Bookmarks" top-level folder; default parent for new nodes.
pub const OTHER_BOOKMARKS_ID: &str = "2";

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Bookmark tree and key-value store")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Visit history feed")?;
    }

    Ok(())
}

fn now_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now_secs(), description],
    )?;
    Ok(())
}

/// V1: bookmark tree with its fixed roots, and the key-value store.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmark_nodes (
            id TEXT PRIMARY KEY,
            parent_id TEXT,
            position INTEGER NOT NULL DEFAULT 0,
            title TEXT NOT NULL,
            url TEXT,
            date_added INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_bookmark_nodes_parent ON bookmark_nodes(parent_id, position);
        CREATE INDEX IF NOT EXISTS idx_bookmark_nodes_title ON bookmark_nodes(title);

        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        ",
    )?;

    let now_ms = now_secs() * 1000;
    conn.execute(
        "INSERT OR IGNORE INTO bookmark_nodes (id, parent_id, position, title, url, date_added) VALUES (?1, NULL, 0, '', NULL, ?2)",
        rusqlite::params![ROOT_ID, now_ms],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO bookmark_nodes (id, parent_id, position, title, url, date_added) VALUES (?1, ?2, 0, 'Bookmarks Bar', NULL, ?3)",
        rusqlite::params![BOOKMARKS_BAR_ID, ROOT_ID, now_ms],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO bookmark_nodes (id, parent_id, position, title, url, date_added) VALUES (?1, ?2, 1, 'Other Bookmarks', NULL, ?3)",
        rusqlite::params![OTHER_BOOKMARKS_ID, ROOT_ID, now_ms],
    )?;
    Ok(())
}

/// V2: per-URL visit counts feeding the usage analyzer.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS visits (
            url TEXT PRIMARY KEY,
            visit_count INTEGER NOT NULL DEFAULT 1,
            last_visit_time INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_visits_last_visit ON visits(last_visit_time);
        ",
    )
}
