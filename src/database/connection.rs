//! SQLite connection for the auditor. Opening always migrates the schema.

use rusqlite::Connection;
use std::path::Path;

use super::migrations;

/// Owns the connection holding the bookmark tree, the key-value store and the
/// visit feed. Managers borrow it through [`Database::connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens or creates the database file at `path` and migrates it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open(path)?)
    }

    /// Migrated in-memory database, gone when dropped.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
