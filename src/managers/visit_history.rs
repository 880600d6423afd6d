//! Visit feed for usage analytics.
//!
//! Implements `VisitSource` over the `visits` table: one row per URL with a
//! visit counter and the last visit time in milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};

use crate::services::health_analyzer::VisitMap;
use crate::types::analytics::VisitInfo;
use crate::types::errors::HistoryError;

/// Where analytics get visit data from.
pub trait VisitSource {
    /// Visit data keyed by URL, or `None` when no history feed is available.
    fn visit_map(&self) -> Result<Option<VisitMap>, HistoryError>;
}

/// Visit history backed by a SQLite connection.
pub struct VisitHistory<'a> {
    conn: &'a Connection,
}

impl<'a> VisitHistory<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in milliseconds.
    fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Records a visit to `url` now.
    pub fn record_visit(&mut self, url: &str) -> Result<VisitInfo, HistoryError> {
        self.record_visit_at(url, Self::now_ms())
    }

    /// Records a visit at an explicit time. The last visit time never moves back.
    pub fn record_visit_at(&mut self, url: &str, time_ms: i64) -> Result<VisitInfo, HistoryError> {
        self.conn
            .execute(
                "INSERT INTO visits (url, visit_count, last_visit_time) VALUES (?1, 1, ?2) \
                 ON CONFLICT(url) DO UPDATE SET visit_count = visit_count + 1, \
                 last_visit_time = MAX(last_visit_time, excluded.last_visit_time)",
                params![url, time_ms],
            )
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        self.conn
            .query_row(
                "SELECT visit_count, last_visit_time FROM visits WHERE url = ?1",
                params![url],
                |row| {
                    Ok(VisitInfo {
                        visit_count: row.get(0)?,
                        last_visit_time: row.get(1)?,
                    })
                },
            )
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))
    }

    /// Deletes all visit data.
    pub fn clear_all(&mut self) -> Result<(), HistoryError> {
        self.conn
            .execute("DELETE FROM visits", [])
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

impl<'a> VisitSource for VisitHistory<'a> {
    fn visit_map(&self) -> Result<Option<VisitMap>, HistoryError> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, visit_count, last_visit_time FROM visits")
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    VisitInfo {
                        visit_count: row.get(1)?,
                        last_visit_time: row.get(2)?,
                    },
                ))
            })
            .map_err(|e| HistoryError::DatabaseError(e.to_string()))?;

        let mut map = VisitMap::new();
        for row in rows {
            let (url, info) = row.map_err(|e| HistoryError::DatabaseError(e.to_string()))?;
            map.insert(url, info);
        }
        Ok(Some(map))
    }
}
