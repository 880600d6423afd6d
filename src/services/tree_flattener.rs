//! Tree flattening.
//!
//! Turns a bookmark tree snapshot into flat lists of links and empty folders.
//! Both walks are pre-order and accumulator-passing, so output order matches
//! the order a user sees the tree in.

use std::collections::BTreeSet;

use crate::types::bookmark::{BookmarkNode, EmptyFolder, FlatLink, NodeKind};
use crate::types::errors::ScanError;

/// Separator used when rendering a path for display.
pub const PATH_SEPARATOR: &str = " > ";

/// Every link under `nodes`, pre-order. `path_prefix` is prepended to each path.
pub fn flatten_links(nodes: &[BookmarkNode], path_prefix: &[String]) -> Vec<FlatLink> {
    let mut out = Vec::new();
    let mut path = path_prefix.to_vec();
    collect_links(nodes, &mut path, &mut out);
    out
}

fn collect_links(nodes: &[BookmarkNode], path: &mut Vec<String>, out: &mut Vec<FlatLink>) {
    for node in nodes {
        match &node.kind {
            NodeKind::Link { url } => out.push(FlatLink {
                id: node.id.clone(),
                title: node.title.clone(),
                url: url.clone(),
                path: path.clone(),
                date_added: node.date_added,
            }),
            NodeKind::Folder { children } => {
                path.push(node.title.clone());
                collect_links(children, path, out);
                path.pop();
            }
        }
    }
}

/// Every folder with zero children under `nodes`, at any depth.
pub fn flatten_empty_folders(nodes: &[BookmarkNode], path_prefix: &[String]) -> Vec<EmptyFolder> {
    let mut out = Vec::new();
    let mut path = path_prefix.to_vec();
    collect_empty_folders(nodes, &mut path, &mut out);
    out
}

fn collect_empty_folders(nodes: &[BookmarkNode], path: &mut Vec<String>, out: &mut Vec<EmptyFolder>) {
    for node in nodes {
        if let NodeKind::Folder { children } = &node.kind {
            if children.is_empty() {
                out.push(EmptyFolder {
                    id: node.id.clone(),
                    title: node.title.clone(),
                    path: path.clone(),
                });
            } else {
                path.push(node.title.clone());
                collect_empty_folders(children, path, out);
                path.pop();
            }
        }
    }
}

/// Number of link nodes under `nodes`.
pub fn count_links(nodes: &[BookmarkNode]) -> usize {
    nodes
        .iter()
        .map(|node| match &node.kind {
            NodeKind::Link { .. } => 1,
            NodeKind::Folder { children } => count_links(children),
        })
        .sum()
}

/// Top-level folders (children of the roots in `tree`) whose IDs are in `scope_ids`.
///
/// # Errors
/// `ScanError::EmptyScope` when `scope_ids` is empty.
pub fn select_scope(tree: &[BookmarkNode], scope_ids: &BTreeSet<String>) -> Result<Vec<BookmarkNode>, ScanError> {
    if scope_ids.is_empty() {
        return Err(ScanError::EmptyScope);
    }
    Ok(tree
        .iter()
        .filter_map(|root| root.children())
        .flatten()
        .filter(|node| scope_ids.contains(&node.id))
        .cloned()
        .collect())
}

/// Copy of `nodes` with the node `id` and everything below it left out.
pub fn without_subtree(nodes: &[BookmarkNode], id: &str) -> Vec<BookmarkNode> {
    nodes
        .iter()
        .filter(|node| node.id != id)
        .map(|node| match &node.kind {
            NodeKind::Folder { children } => BookmarkNode {
                kind: NodeKind::Folder {
                    children: without_subtree(children, id),
                },
                ..node.clone()
            },
            NodeKind::Link { .. } => node.clone(),
        })
        .collect()
}

/// Renders a path as `A > B > C`.
pub fn format_path(path: &[String]) -> String {
    path.join(PATH_SEPARATOR)
}
