//! Soft-delete manager.
//!
//! Deleting a bookmark moves it into a recycle container folder and records
//! where it came from. The restore map persisted under [`RESTORE_MAP_KEY`] is
//! the only source of truth for what can be restored: a node sitting in the
//! container without a record stays there until the bin is emptied.
//!
//! Batch operations are best-effort. Per-item failures are logged and skipped.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::database::KeyValueStore;
use crate::managers::bookmark_store::BookmarkProvider;
use crate::types::bookmark::{BookmarkNode, CreateDetails, MoveDestination};
use crate::types::errors::{ProviderError, RecycleError, StoreError};
use crate::types::recycle::{RecycledItem, RestoreRecord};
use crate::types::settings::Language;

pub const RESTORE_MAP_KEY: &str = "restoreMap";

/// Restore records keyed by node ID.
pub type RestoreMap = BTreeMap<String, RestoreRecord>;

/// Trait defining soft-delete operations.
pub trait RecycleManagerTrait {
    fn resolve_recycle_container(&mut self) -> Result<String, RecycleError>;
    fn soft_delete(&mut self, ids: &[String]) -> Result<usize, RecycleError>;
    fn restore(&mut self, ids: &[String]) -> Result<usize, RecycleError>;
    fn empty_recycle_bin(&mut self, confirmed: bool) -> Result<usize, RecycleError>;
    fn list_recycled(&mut self) -> Result<Vec<RecycledItem>, RecycleError>;
    fn prune_orphans(&mut self) -> Result<usize, RecycleError>;
}

/// Recycle manager over a bookmark provider and a key-value store.
pub struct RecycleManager<P: BookmarkProvider, S: KeyValueStore> {
    provider: P,
    store: S,
    language: Language,
}

impl<P: BookmarkProvider, S: KeyValueStore> RecycleManager<P, S> {
    pub fn new(provider: P, store: S, language: Language) -> Self {
        Self {
            provider,
            store,
            language,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Loads the restore map. A corrupt value is treated as empty.
    pub fn load_restore_map(&self) -> Result<RestoreMap, RecycleError> {
        match self.store.get_json::<RestoreMap>(RESTORE_MAP_KEY) {
            Ok(map) => Ok(map.unwrap_or_default()),
            Err(StoreError::SerializationError(msg)) => {
                warn!(error = %msg, "restore map unreadable, starting empty");
                Ok(RestoreMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_restore_map(&self, map: &RestoreMap) -> Result<(), RecycleError> {
        self.store.set_json(RESTORE_MAP_KEY, map)?;
        Ok(())
    }

    /// IDs of the folders directly under the root.
    fn top_level_ids(&self) -> Result<Vec<String>, RecycleError> {
        let root = self.provider.root_id().to_string();
        Ok(self
            .provider
            .get_children(&root)?
            .into_iter()
            .map(|node| node.id)
            .collect())
    }

    /// The existing recycle container, without creating one.
    pub fn find_container(&self) -> Result<Option<BookmarkNode>, RecycleError> {
        let title = self.language.recycle_bin_title();
        let top_level = self.top_level_ids()?;
        Ok(self
            .provider
            .search_by_title(title)?
            .into_iter()
            .find(|node| {
                node.is_folder()
                    && node
                        .parent_id
                        .as_ref()
                        .is_some_and(|parent| top_level.contains(parent))
            }))
    }
}

impl<P: BookmarkProvider, S: KeyValueStore> RecycleManagerTrait for RecycleManager<P, S> {
    /// Finds the recycle container or creates it under the default parent.
    ///
    /// When several folders carry the localized title the first one wins.
    fn resolve_recycle_container(&mut self) -> Result<String, RecycleError> {
        if let Some(container) = self.find_container()? {
            return Ok(container.id);
        }
        let parent_id = self.provider.default_parent_id().to_string();
        let created = self.provider.create(CreateDetails {
            parent_id: Some(parent_id),
            index: None,
            title: self.language.recycle_bin_title().to_string(),
            url: None,
        })?;
        info!(id = %created.id, title = %created.title, "created recycle container");
        Ok(created.id)
    }

    /// Moves each node into the recycle container and records its origin.
    /// Returns the number of nodes moved.
    ///
    /// Origins are read for the whole batch before anything moves, so siblings
    /// deleted together keep their original indexes.
    fn soft_delete(&mut self, ids: &[String]) -> Result<usize, RecycleError> {
        let container = self.resolve_recycle_container()?;
        let mut map = self.load_restore_map()?;

        let mut batch: Vec<(String, String, u32)> = Vec::with_capacity(ids.len());
        for id in ids {
            if *id == container {
                debug!(id = %id, "skipping recycle container itself");
                continue;
            }
            if batch.iter().any(|(queued, _, _)| queued == id) {
                continue;
            }
            let node = match self.provider.get(id) {
                Ok(node) => node,
                Err(e) => {
                    warn!(id = %id, error = %e, "soft delete skipped");
                    continue;
                }
            };
            match node.parent_id {
                Some(parent) if parent != container => batch.push((id.clone(), parent, node.index)),
                Some(_) => debug!(id = %id, "already in recycle container"),
                None => warn!(id = %id, "soft delete skipped: node has no parent"),
            }
        }

        let mut moved = 0;
        for (id, original_parent_id, original_index) in batch {
            let dest = MoveDestination {
                parent_id: container.clone(),
                index: None,
            };
            match self.provider.move_node(&id, &dest) {
                Ok(_) => {
                    map.insert(
                        id.clone(),
                        RestoreRecord {
                            node_id: id,
                            original_parent_id,
                            original_index,
                            deleted_at: Utc::now(),
                        },
                    );
                    moved += 1;
                }
                Err(e) => warn!(id = %id, error = %e, "soft delete failed"),
            }
        }

        self.save_restore_map(&map)?;
        info!(requested = ids.len(), moved, "soft delete finished");
        Ok(moved)
    }

    /// Moves recorded nodes back to their original parent and index.
    /// Items without a record or whose parent is gone are skipped.
    ///
    /// Items are restored lowest original index first, so each one lands
    /// after the siblings that preceded it.
    fn restore(&mut self, ids: &[String]) -> Result<usize, RecycleError> {
        let mut map = self.load_restore_map()?;
        let mut pending: Vec<RestoreRecord> = Vec::with_capacity(ids.len());
        for id in ids {
            if pending.iter().any(|record| record.node_id == *id) {
                continue;
            }
            match map.get(id) {
                Some(record) => pending.push(record.clone()),
                None => warn!(id = %id, "restore skipped: no restore record"),
            }
        }
        pending.sort_by_key(|record| record.original_index);

        let mut restored = 0;
        for record in pending {
            let id = &record.node_id;
            if let Err(e) = self.provider.get(&record.original_parent_id) {
                warn!(
                    id = %id,
                    parent = %record.original_parent_id,
                    error = %e,
                    "restore skipped: original parent unavailable"
                );
                continue;
            }

            let dest = MoveDestination {
                parent_id: record.original_parent_id.clone(),
                index: Some(record.original_index),
            };
            match self.provider.move_node(id, &dest) {
                Ok(_) => {
                    map.remove(id);
                    restored += 1;
                }
                Err(e) => warn!(id = %id, error = %e, "restore failed"),
            }
        }

        self.save_restore_map(&map)?;
        info!(requested = ids.len(), restored, "restore finished");
        Ok(restored)
    }

    /// Permanently removes everything in the recycle container.
    ///
    /// # Errors
    /// `RecycleError::ConfirmationRequired` unless `confirmed` is true; nothing
    /// is touched in that case.
    fn empty_recycle_bin(&mut self, confirmed: bool) -> Result<usize, RecycleError> {
        if !confirmed {
            return Err(RecycleError::ConfirmationRequired);
        }
        let container = self.resolve_recycle_container()?;
        let mut map = self.load_restore_map()?;
        let mut removed = 0;

        for child in self.provider.get_children(&container)? {
            match self.provider.remove_subtree(&child.id) {
                Ok(()) => {
                    map.remove(&child.id);
                    removed += 1;
                }
                Err(e) => warn!(id = %child.id, error = %e, "permanent delete failed"),
            }
        }

        self.save_restore_map(&map)?;
        info!(removed, "recycle bin emptied");
        Ok(removed)
    }

    /// Direct children of the recycle container.
    fn list_recycled(&mut self) -> Result<Vec<RecycledItem>, RecycleError> {
        let container = self.resolve_recycle_container()?;
        let map = self.load_restore_map()?;
        Ok(self
            .provider
            .get_children(&container)?
            .into_iter()
            .map(|node| RecycledItem {
                restorable: map.contains_key(&node.id),
                node,
            })
            .collect())
    }

    /// Drops restore records whose node no longer exists.
    fn prune_orphans(&mut self) -> Result<usize, RecycleError> {
        let mut map = self.load_restore_map()?;
        let before = map.len();
        let mut missing = Vec::new();
        for id in map.keys() {
            match self.provider.get(id) {
                Ok(_) => {}
                Err(ProviderError::NotFound(_)) => missing.push(id.clone()),
                Err(e) => return Err(e.into()),
            }
        }
        for id in &missing {
            map.remove(id);
        }
        if map.len() != before {
            self.save_restore_map(&map)?;
        }
        Ok(missing.len())
    }
}
