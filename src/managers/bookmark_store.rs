//! Bookmark storage provider.
//!
//! Defines `BookmarkProvider`, the tree-shaped contract the audit engine
//! consumes, and `SqliteBookmarkProvider`, an implementation over the
//! `bookmark_nodes` table with browser-like semantics: a fixed invisible root,
//! fixed top-level folders, dense sibling positions.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::database::migrations::{OTHER_BOOKMARKS_ID, ROOT_ID};
use crate::types::bookmark::{BookmarkNode, CreateDetails, MoveDestination, NodeKind};
use crate::types::errors::ProviderError;

/// Operations the engine needs from a bookmark store.
pub trait BookmarkProvider {
    /// ID of the invisible root whose children are the top-level folders.
    fn root_id(&self) -> &str;
    /// Parent used by `create` when none is given.
    fn default_parent_id(&self) -> &str;
    /// Returns the whole forest; a single root node for this store.
    fn get_tree(&self) -> Result<Vec<BookmarkNode>, ProviderError>;
    fn get(&self, id: &str) -> Result<BookmarkNode, ProviderError>;
    fn get_children(&self, id: &str) -> Result<Vec<BookmarkNode>, ProviderError>;
    fn create(&mut self, details: CreateDetails) -> Result<BookmarkNode, ProviderError>;
    fn move_node(&mut self, id: &str, dest: &MoveDestination) -> Result<BookmarkNode, ProviderError>;
    /// Removes a link or an empty folder.
    fn remove(&mut self, id: &str) -> Result<(), ProviderError>;
    /// Removes a node and everything below it.
    fn remove_subtree(&mut self, id: &str) -> Result<(), ProviderError>;
    /// Nodes whose title equals `title` exactly, oldest first.
    fn search_by_title(&self, title: &str) -> Result<Vec<BookmarkNode>, ProviderError>;
}

/// Raw `bookmark_nodes` row.
#[derive(Debug, Clone)]
struct NodeRow {
    id: String,
    parent_id: Option<String>,
    position: i64,
    title: String,
    url: Option<String>,
    date_added: i64,
}

const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS ( \
         SELECT id FROM bookmark_nodes WHERE id = ?1 \
         UNION ALL \
         SELECT n.id FROM bookmark_nodes n JOIN subtree s ON n.parent_id = s.id \
     )";

/// Bookmark provider backed by a SQLite connection.
pub struct SqliteBookmarkProvider<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteBookmarkProvider<'a> {
    /// Creates a provider using the provided database connection.
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

    fn db_err(e: rusqlite::Error) -> ProviderError {
        ProviderError::DatabaseError(e.to_string())
    }

    fn row_to_node_row(row: &rusqlite::Row) -> rusqlite::Result<NodeRow> {
        Ok(NodeRow {
            id: row.get(0)?,
            parent_id: row.get(1)?,
            position: row.get(2)?,
            title: row.get(3)?,
            url: row.get(4)?,
            date_added: row.get(5)?,
        })
    }

    fn fetch_row(&self, id: &str) -> Result<NodeRow, ProviderError> {
        self.conn
            .query_row(
                "SELECT id, parent_id, position, title, url, date_added FROM bookmark_nodes WHERE id = ?1",
                params![id],
                Self::row_to_node_row,
            )
            .optional()
            .map_err(Self::db_err)?
            .ok_or_else(|| ProviderError::NotFound(id.to_string()))
    }

    /// Rows of `id` and all of its descendants.
    fn fetch_subtree_rows(&self, id: &str) -> Result<Vec<NodeRow>, ProviderError> {
        let sql = format!(
            "{} SELECT n.id, n.parent_id, n.position, n.title, n.url, n.date_added \
             FROM bookmark_nodes n JOIN subtree s ON n.id = s.id",
            SUBTREE_CTE
        );
        let mut stmt = self.conn.prepare(&sql).map_err(Self::db_err)?;
        let rows = stmt
            .query_map(params![id], Self::row_to_node_row)
            .map_err(Self::db_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(Self::db_err)?);
        }
        Ok(results)
    }

    /// Assembles nested nodes from a flat set of rows rooted at `root`.
    fn build_tree(root: NodeRow, rows: Vec<NodeRow>) -> BookmarkNode {
        let mut by_parent: HashMap<String, Vec<NodeRow>> = HashMap::new();
        for row in rows {
            if let Some(parent) = row.parent_id.clone() {
                by_parent.entry(parent).or_default().push(row);
            }
        }
        for siblings in by_parent.values_mut() {
            siblings.sort_by_key(|r| r.position);
        }
        Self::assemble(root, &mut by_parent)
    }

    fn assemble(row: NodeRow, by_parent: &mut HashMap<String, Vec<NodeRow>>) -> BookmarkNode {
        let kind = match row.url {
            Some(url) => NodeKind::Link { url },
            None => {
                let children = by_parent
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|child| Self::assemble(child, by_parent))
                    .collect();
                NodeKind::Folder { children }
            }
        };
        BookmarkNode {
            id: row.id,
            parent_id: row.parent_id,
            index: row.position.max(0) as u32,
            title: row.title,
            date_added: row.date_added,
            kind,
        }
    }

    fn load_node(&self, id: &str) -> Result<BookmarkNode, ProviderError> {
        let root = self.fetch_row(id)?;
        let rows: Vec<NodeRow> = self
            .fetch_subtree_rows(id)?
            .into_iter()
            .filter(|r| r.id != root.id)
            .collect();
        Ok(Self::build_tree(root, rows))
    }

    fn child_count(&self, parent_id: &str) -> Result<i64, ProviderError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM bookmark_nodes WHERE parent_id = ?1",
                params![parent_id],
                |row| row.get(0),
            )
            .map_err(Self::db_err)
    }

    fn require_folder(&self, id: &str) -> Result<NodeRow, ProviderError> {
        let row = self.fetch_row(id)?;
        if row.url.is_some() {
            return Err(ProviderError::NotAFolder(id.to_string()));
        }
        Ok(row)
    }

    /// The root and its direct children are fixed.
    fn require_mutable(&self, row: &NodeRow) -> Result<(), ProviderError> {
        match row.parent_id.as_deref() {
            None => Err(ProviderError::RootModification(row.id.clone())),
            Some(parent) if parent == ROOT_ID => Err(ProviderError::RootModification(row.id.clone())),
            Some(_) => Ok(()),
        }
    }

    /// Clamps a requested index to `[0, count]`; `None` means append.
    fn insertion_index(requested: Option<u32>, count: i64) -> i64 {
        match requested {
            Some(i) => (i as i64).min(count),
            None => count,
        }
    }

    /// Closes the gap left by a node leaving `parent_id` at `position`.
    fn close_gap(conn: &Connection, parent_id: &str, position: i64) -> Result<(), ProviderError> {
        conn.execute(
            "UPDATE bookmark_nodes SET position = position - 1 WHERE parent_id = ?1 AND position > ?2",
            params![parent_id, position],
        )
        .map_err(Self::db_err)?;
        Ok(())
    }

    /// Opens a slot at `position` under `parent_id`.
    fn open_gap(conn: &Connection, parent_id: &str, position: i64) -> Result<(), ProviderError> {
        conn.execute(
            "UPDATE bookmark_nodes SET position = position + 1 WHERE parent_id = ?1 AND position >= ?2",
            params![parent_id, position],
        )
        .map_err(Self::db_err)?;
        Ok(())
    }
}

impl<'a> BookmarkProvider for SqliteBookmarkProvider<'a> {
    fn root_id(&self) -> &str {
        ROOT_ID
    }

    fn default_parent_id(&self) -> &str {
        OTHER_BOOKMARKS_ID
    }

    fn get_tree(&self) -> Result<Vec<BookmarkNode>, ProviderError> {
        Ok(vec![self.load_node(ROOT_ID)?])
    }

    fn get(&self, id: &str) -> Result<BookmarkNode, ProviderError> {
        self.load_node(id)
    }

    fn get_children(&self, id: &str) -> Result<Vec<BookmarkNode>, ProviderError> {
        self.require_folder(id)?;
        match self.load_node(id)?.kind {
            NodeKind::Folder { children } => Ok(children),
            NodeKind::Link { .. } => Err(ProviderError::NotAFolder(id.to_string())),
        }
    }

    /// Creates a link (`url` set) or folder. Returns the stored node.
    fn create(&mut self, details: CreateDetails) -> Result<BookmarkNode, ProviderError> {
        let parent_id = details
            .parent_id
            .unwrap_or_else(|| self.default_parent_id().to_string());
        self.require_folder(&parent_id)?;

        let id = Uuid::new_v4().to_string();
        let position = Self::insertion_index(details.index, self.child_count(&parent_id)?);

        let tx = self.conn.unchecked_transaction().map_err(Self::db_err)?;
        Self::open_gap(&tx, &parent_id, position)?;
        tx.execute(
            "INSERT INTO bookmark_nodes (id, parent_id, position, title, url, date_added) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![id, parent_id, position, details.title, details.url, Self::now_ms()],
        )
        .map_err(Self::db_err)?;
        tx.commit().map_err(Self::db_err)?;

        self.load_node(&id)
    }

    fn move_node(&mut self, id: &str, dest: &MoveDestination) -> Result<BookmarkNode, ProviderError> {
        let row = self.fetch_row(id)?;
        self.require_mutable(&row)?;
        self.require_folder(&dest.parent_id)?;

        if row.url.is_none() {
            let inside = self
                .fetch_subtree_rows(id)?
                .iter()
                .any(|r| r.id == dest.parent_id);
            if inside {
                return Err(ProviderError::InvalidMove(format!(
                    "{} cannot be moved into its own subtree",
                    id
                )));
            }
        }

        let old_parent = row.parent_id.clone().unwrap_or_default();
        let tx = self.conn.unchecked_transaction().map_err(Self::db_err)?;
        Self::close_gap(&tx, &old_parent, row.position)?;

        let remaining: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM bookmark_nodes WHERE parent_id = ?1 AND id != ?2",
                params![dest.parent_id, id],
                |r| r.get(0),
            )
            .map_err(Self::db_err)?;
        let position = Self::insertion_index(dest.index, remaining);

        // Park the node outside any sibling list before shifting.
        tx.execute(
            "UPDATE bookmark_nodes SET parent_id = NULL, position = -1 WHERE id = ?1",
            params![id],
        )
        .map_err(Self::db_err)?;
        Self::open_gap(&tx, &dest.parent_id, position)?;
        tx.execute(
            "UPDATE bookmark_nodes SET parent_id = ?1, position = ?2 WHERE id = ?3",
            params![dest.parent_id, position, id],
        )
        .map_err(Self::db_err)?;
        tx.commit().map_err(Self::db_err)?;

        self.load_node(id)
    }

    fn remove(&mut self, id: &str) -> Result<(), ProviderError> {
        let row = self.fetch_row(id)?;
        self.require_mutable(&row)?;
        if row.url.is_none() && self.child_count(id)? > 0 {
            return Err(ProviderError::FolderNotEmpty(id.to_string()));
        }

        let tx = self.conn.unchecked_transaction().map_err(Self::db_err)?;
        tx.execute("DELETE FROM bookmark_nodes WHERE id = ?1", params![id])
            .map_err(Self::db_err)?;
        if let Some(parent) = row.parent_id.as_deref() {
            Self::close_gap(&tx, parent, row.position)?;
        }
        tx.commit().map_err(Self::db_err)?;
        Ok(())
    }

    fn remove_subtree(&mut self, id: &str) -> Result<(), ProviderError> {
        let row = self.fetch_row(id)?;
        self.require_mutable(&row)?;

        let tx = self.conn.unchecked_transaction().map_err(Self::db_err)?;
        tx.execute(
            &format!(
                "{} DELETE FROM bookmark_nodes WHERE id IN (SELECT id FROM subtree)",
                SUBTREE_CTE
            ),
            params![id],
        )
        .map_err(Self::db_err)?;
        if let Some(parent) = row.parent_id.as_deref() {
            Self::close_gap(&tx, parent, row.position)?;
        }
        tx.commit().map_err(Self::db_err)?;
        Ok(())
    }

    fn search_by_title(&self, title: &str) -> Result<Vec<BookmarkNode>, ProviderError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id FROM bookmark_nodes \
                 WHERE title = ?1 AND parent_id IS NOT NULL \
                 ORDER BY date_added, rowid",
            )
            .map_err(Self::db_err)?;
        let rows = stmt
            .query_map(params![title], |row| row.get::<_, String>(0))
            .map_err(Self::db_err)?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(Self::db_err)?);
        }
        ids.iter().map(|id| self.load_node(id)).collect()
    }
}
