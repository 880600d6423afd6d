use serde::{Deserialize, Serialize};

/// A node in the bookmark tree as exposed by the storage provider.
///
/// Exactly one of link or folder holds; the variant lives in `kind` and is
/// flattened so the serialized form carries either `url` or `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub index: u32,
    pub title: String,
    /// Milliseconds since the UNIX epoch.
    #[serde(default)]
    pub date_added: i64,
    #[serde(flatten)]
    pub kind: NodeKind,
}

/// Link or folder payload of a [`BookmarkNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKind {
    Link { url: String },
    Folder { children: Vec<BookmarkNode> },
}

impl BookmarkNode {
    /// Builds a link node. Mostly useful for fixtures.
    pub fn link(id: &str, title: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            parent_id: None,
            index: 0,
            title: title.to_string(),
            date_added: 0,
            kind: NodeKind::Link { url: url.to_string() },
        }
    }

    /// Builds a folder node with the given children.
    pub fn folder(id: &str, title: &str, children: Vec<BookmarkNode>) -> Self {
        Self {
            id: id.to_string(),
            parent_id: None,
            index: 0,
            title: title.to_string(),
            date_added: 0,
            kind: NodeKind::Folder { children },
        }
    }

    pub fn with_date_added(mut self, date_added: i64) -> Self {
        self.date_added = date_added;
        self
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Link { url } => Some(url),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn children(&self) -> Option<&[BookmarkNode]> {
        match &self.kind {
            NodeKind::Folder { children } => Some(children),
            NodeKind::Link { .. } => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }
}

/// A link lifted out of the tree, with the titles of its ancestor folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatLink {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Ancestor folder titles, root first. The link's own title is not included.
    pub path: Vec<String>,
    pub date_added: i64,
}

/// A folder with no children at traversal time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyFolder {
    pub id: String,
    pub title: String,
    pub path: Vec<String>,
}

/// Links sharing one normalized URL. Always holds at least two members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub normalized_url: String,
    pub members: Vec<FlatLink>,
}

/// Arguments for creating a node through the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateDetails {
    pub parent_id: Option<String>,
    pub index: Option<u32>,
    pub title: String,
    /// `None` creates a folder.
    pub url: Option<String>,
}

/// Target location for a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDestination {
    pub parent_id: String,
    /// Appends to the end of the parent when `None`.
    pub index: Option<u32>,
}
