//! Testing utilities for treepick
//!
//! Provides [`TreeProvider`], an in-memory node provider whose ids are
//! slash-separated paths (`/`, `/docs`, `/docs/a.txt`). Missing parent
//! directories are created on insert, and any node can be marked as
//! unreadable to exercise access-denied paths.
//!
//! Only available when compiled with `cfg(test)`.

use std::collections::{BTreeMap, BTreeSet};

use crate::node::{Node, NodeId, SortField, SortKey};
use crate::provider::{NodeProvider, ProviderError, Result};

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    children: Vec<NodeId>,
}

/// In-memory tree used by engine tests
///
/// # Examples
/// ```ignore
/// let tree = TreeProvider::new()
///     .dir("/docs")
///     .file("/docs/a.txt")
///     .file_sized("/b.bin", 42);
/// ```
#[derive(Debug, Clone)]
pub struct TreeProvider {
    entries: BTreeMap<NodeId, Entry>,
    denied: BTreeSet<NodeId>,
    root: NodeId,
    boundary: Option<NodeId>,
}

impl Default for TreeProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn parent_of(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rsplit_once('/') {
        Some(("", _)) => Some("/"),
        Some((parent, _)) => Some(parent),
        None => None,
    }
}

fn label_of(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(path)
}

impl TreeProvider {
    /// Tree holding only the `/` root
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId::new("/");
        let mut entries = BTreeMap::new();
        entries.insert(
            root.clone(),
            Entry {
                node: Node::container("/", "/"),
                children: Vec::new(),
            },
        );
        Self {
            entries,
            denied: BTreeSet::new(),
            root: root.clone(),
            boundary: Some(root),
        }
    }

    fn insert(&mut self, node: Node) {
        let id = node.id.clone();
        if self.entries.contains_key(&id) {
            return;
        }
        let parent = parent_of(id.as_str()).map(NodeId::new);
        if let Some(parent) = &parent {
            if !self.entries.contains_key(parent) {
                self.insert(Node::container(parent.clone(), label_of(parent.as_str())));
            }
            if let Some(entry) = self.entries.get_mut(parent) {
                entry.children.push(id.clone());
            }
        }
        let node = match parent {
            Some(parent) => node.with_parent(parent),
            None => node,
        };
        self.entries.insert(
            id,
            Entry {
                node,
                children: Vec::new(),
            },
        );
    }

    /// Add a directory (not selectable)
    #[must_use]
    pub fn dir(mut self, path: &str) -> Self {
        self.insert(Node::container(path, label_of(path)));
        self
    }

    /// Add a directory that may be picked
    #[must_use]
    pub fn selectable_dir(mut self, path: &str) -> Self {
        self.insert(Node::container(path, label_of(path)).with_selectable(true));
        self
    }

    /// Add a selectable file
    #[must_use]
    pub fn file(mut self, path: &str) -> Self {
        self.insert(Node::leaf(path, label_of(path)));
        self
    }

    /// Add a selectable file with a size key
    #[must_use]
    pub fn file_sized(mut self, path: &str, size: i64) -> Self {
        self.insert(
            Node::leaf(path, label_of(path)).with_key(SortField::Size, SortKey::Number(size)),
        );
        self
    }

    /// Add a file that may not be picked
    #[must_use]
    pub fn locked_file(mut self, path: &str) -> Self {
        self.insert(Node::leaf(path, label_of(path)).with_selectable(false));
        self
    }

    /// Open at `path` instead of `/`
    #[must_use]
    pub fn starting_at(mut self, path: &str) -> Self {
        self.root = NodeId::new(path);
        self
    }

    /// Containment boundary reported to the engine
    #[must_use]
    pub fn bounded_by(mut self, path: Option<&str>) -> Self {
        self.boundary = path.map(NodeId::new);
        self
    }

    /// Make `path` fail enumeration
    pub fn deny(&mut self, path: &str) {
        self.denied.insert(NodeId::new(path));
    }

    /// Make `path` readable again
    pub fn allow(&mut self, path: &str) {
        self.denied.remove(&NodeId::new(path));
    }

    /// Node stored at `path`
    ///
    /// # Panics
    /// Panics if no node exists at `path`.
    #[must_use]
    pub fn node(&self, path: &str) -> Node {
        self.entries
            .get(&NodeId::new(path))
            .map(|entry| entry.node.clone())
            .unwrap_or_else(|| panic!("no node at {path}"))
    }

    fn lookup(&self, id: &NodeId) -> Result<&Entry> {
        self.entries
            .get(id)
            .ok_or_else(|| ProviderError::InvalidNode(id.to_string()))
    }
}

impl NodeProvider for TreeProvider {
    fn root(&self) -> Result<Node> {
        self.lookup(&self.root).map(|entry| entry.node.clone())
    }

    fn children(&self, node: &Node) -> Result<Vec<Node>> {
        if self.denied.contains(&node.id) {
            return Err(ProviderError::denied(&node.id, "permission denied"));
        }
        let entry = self.lookup(&node.id)?;
        entry
            .children
            .iter()
            .map(|id| self.lookup(id).map(|child| child.node.clone()))
            .collect()
    }

    fn parent(&self, node: &Node) -> Result<Option<Node>> {
        node.parent
            .as_ref()
            .map(|id| self.lookup(id).map(|entry| entry.node.clone()))
            .transpose()
    }

    fn is_within(&self, id: &NodeId, boundary: &NodeId) -> bool {
        let (id, boundary) = (id.as_str(), boundary.as_str());
        boundary == "/"
            || id == boundary
            || id
                .strip_prefix(boundary)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn boundary(&self) -> Option<NodeId> {
        self.boundary.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parents_are_created() {
        let tree = TreeProvider::new().file("/a/b/c.txt");
        let b = tree.node("/a/b");
        assert!(b.is_container());
        assert_eq!(b.label(), "b");
        assert_eq!(b.parent, Some(NodeId::new("/a")));
        assert_eq!(tree.node("/a").parent, Some(NodeId::new("/")));
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let tree = TreeProvider::new().file("/z").dir("/a");
        let root = tree.root().unwrap();
        let labels: Vec<_> = tree
            .children(&root)
            .unwrap()
            .iter()
            .map(|n| n.label().to_string())
            .collect();
        assert_eq!(labels, vec!["z", "a"]);
    }

    #[test]
    fn test_deny_and_allow() {
        let mut tree = TreeProvider::new().dir("/locked");
        let locked = tree.node("/locked");
        tree.deny("/locked");
        assert!(tree.children(&locked).is_err());
        tree.allow("/locked");
        assert!(tree.children(&locked).unwrap().is_empty());
    }
}
