//! Analytics trend log: the last few health snapshots, oldest first.

use tracing::warn;

use crate::database::KeyValueStore;
use crate::types::analytics::{TrendDelta, TrendPoint};
use crate::types::errors::{HistoryError, StoreError};

pub const TREND_HISTORY_KEY: &str = "analytics_history";
pub const MAX_TREND_POINTS: usize = 10;

pub struct TrendHistory<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TrendHistory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn list(&self) -> Result<Vec<TrendPoint>, HistoryError> {
        match self.store.get_json::<Vec<TrendPoint>>(TREND_HISTORY_KEY) {
            Ok(points) => Ok(points.unwrap_or_default()),
            Err(StoreError::SerializationError(msg)) => {
                warn!(error = %msg, "trend log unreadable, starting empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Appends `point` and returns the change since the previous point, if any.
    pub fn record(&mut self, point: TrendPoint) -> Result<Option<TrendDelta>, HistoryError> {
        let mut points = self.list()?;
        let delta = points.last().map(|prev| TrendDelta {
            total: point.total - prev.total,
            invalid: point.invalid - prev.invalid,
            duplicate: point.duplicate - prev.duplicate,
        });
        points.push(point);
        if points.len() > MAX_TREND_POINTS {
            let excess = points.len() - MAX_TREND_POINTS;
            points.drain(..excess);
        }
        self.store.set_json(TREND_HISTORY_KEY, &points)?;
        Ok(delta)
    }
}
