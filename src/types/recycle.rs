use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bookmark::BookmarkNode;

/// Where a soft-deleted node came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreRecord {
    pub node_id: String,
    pub original_parent_id: String,
    pub original_index: u32,
    pub deleted_at: DateTime<Utc>,
}

/// A direct child of the recycle container.
#[derive(Debug, Clone, Serialize)]
pub struct RecycledItem {
    pub node: BookmarkNode,
    /// Whether a restore record exists for this node.
    pub restorable: bool,
}
