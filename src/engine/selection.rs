//! Selection set and mode policy
//!
//! [`SelectionPolicy::apply`] is a pure transition from one [`Selection`] to
//! the next. The engine is the only caller that swaps the authoritative set,
//! so a renderer never observes an intermediate state.

use crate::node::{Node, NodeId};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How many nodes may be picked at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one picked node
    #[default]
    Single,
    /// Any number of picked nodes
    Multi,
}

/// Picked nodes, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    picked: Vec<Node>,
}

impl Selection {
    #[must_use]
    pub const fn new() -> Self {
        Self { picked: Vec::new() }
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.picked.iter().any(|node| &node.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.picked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.picked.is_empty()
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.picked
    }

    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.picked.iter().map(|node| &node.id)
    }

    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        self.picked
    }

    fn without(&self, id: &NodeId) -> Self {
        Self {
            picked: self
                .picked
                .iter()
                .filter(|node| &node.id != id)
                .cloned()
                .collect(),
        }
    }

    fn with(&self, node: &Node) -> Self {
        let mut picked = self.picked.clone();
        picked.push(node.clone());
        Self { picked }
    }
}

/// Mode-parameterized toggle rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionPolicy {
    mode: SelectionMode,
}

impl SelectionPolicy {
    #[must_use]
    pub const fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Selection after toggling `item`
    ///
    /// - not selectable: unchanged
    /// - already picked: removed
    /// - single mode: replaces whatever was picked
    /// - multi mode: appended
    #[must_use]
    pub fn apply(&self, current: &Selection, item: &Node, already_picked: bool) -> Selection {
        if !item.selectable {
            return current.clone();
        }
        if already_picked {
            return current.without(&item.id);
        }
        match self.mode {
            SelectionMode::Single => Selection::new().with(item),
            SelectionMode::Multi => current.with(item),
        }
    }
}
