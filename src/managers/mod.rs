// Bookmark Audit state managers
// Managers handle stateful operations: the bookmark store, the recycle bin, scan history, trends and visits.

pub mod bookmark_store;
pub mod recycle_manager;
pub mod scan_history;
pub mod trend_history;
pub mod visit_history;
