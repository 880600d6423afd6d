//! Database layer.
//!
//! Provides SQLite connection management, schema migrations and the
//! string-keyed store used for settings and logs.
//!
//! # Usage
//!
//! ```no_run
//! use bookmark_audit::database::{Database, KeyValueStore, SqliteKvStore};
//!
//! let db = Database::open("bookmark-audit.db").expect("failed to open database");
//! let store = SqliteKvStore::new(db.connection());
//! store.set("language", "\"en_US\"").expect("write failed");
//! ```

pub mod connection;
pub mod kv_store;
pub mod migrations;

pub use connection::Database;
pub use kv_store::{KeyValueStore, SqliteKvStore};
