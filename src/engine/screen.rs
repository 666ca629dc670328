//! Materialized view of one container
//!
//! A [`Screen`] is rebuilt on every navigation step. Row 0 is the synthetic
//! up-item when one exists; the sorted children follow.

use super::navigation::ScrollOffset;
use crate::node::{Description, Node, NodeId, NodeKind};

/// Synthetic "go to parent" row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpItem {
    /// Container the row leads to
    pub target: NodeId,
    pub description: Description,
}

/// One tappable row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Up(UpItem),
    Container(Node),
    Leaf(Node),
}

impl ListItem {
    /// Classify a provider node
    #[must_use]
    pub fn from_node(node: Node) -> Self {
        match node.kind {
            NodeKind::Container => Self::Container(node),
            NodeKind::Leaf => Self::Leaf(node),
        }
    }

    #[must_use]
    pub const fn node(&self) -> Option<&Node> {
        match self {
            Self::Up(_) => None,
            Self::Container(node) | Self::Leaf(node) => Some(node),
        }
    }

    #[must_use]
    pub const fn description(&self) -> &Description {
        match self {
            Self::Up(up) => &up.description,
            Self::Container(node) | Self::Leaf(node) => &node.description,
        }
    }
}

/// Ordered children of the current anchor plus optional up-item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Container being browsed
    pub anchor: Node,
    /// Header facts (title, path or breadcrumb)
    pub header: Description,
    /// Present iff the anchor has a parent inside the root boundary
    pub up_item: Option<UpItem>,
    /// Sorted, provider-filtered children
    pub items: Vec<Node>,
    /// Position to restore the list at
    pub scroll: ScrollOffset,
}

impl Screen {
    /// Number of rows, up-item included
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + usize::from(self.up_item.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row at `index` as the host lays it out
    #[must_use]
    pub fn row(&self, index: usize) -> Option<ListItem> {
        match (&self.up_item, index) {
            (Some(up), 0) => Some(ListItem::Up(up.clone())),
            (Some(_), i) => self.items.get(i - 1).cloned().map(ListItem::from_node),
            (None, i) => self.items.get(i).cloned().map(ListItem::from_node),
        }
    }

    /// All rows in display order
    #[must_use]
    pub fn rows(&self) -> Vec<ListItem> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }

    /// Row index of a child
    #[must_use]
    pub fn position(&self, id: &NodeId) -> Option<usize> {
        let offset = usize::from(self.up_item.is_some());
        self.items
            .iter()
            .position(|node| &node.id == id)
            .map(|i| i + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::IconKey;

    fn screen(with_up: bool) -> Screen {
        Screen {
            anchor: Node::container("/a", "a"),
            header: Description::new("a", "/a", IconKey::Header),
            up_item: with_up.then(|| UpItem {
                target: NodeId::new("/"),
                description: Description::new("..", "Parent directory", IconKey::Back),
            }),
            items: vec![Node::container("/a/d", "d"), Node::leaf("/a/f", "f")],
            scroll: ScrollOffset::default(),
        }
    }

    #[test]
    fn test_up_item_is_row_zero() {
        let s = screen(true);
        assert_eq!(s.len(), 3);
        assert!(matches!(s.row(0), Some(ListItem::Up(_))));
        assert!(matches!(s.row(1), Some(ListItem::Container(_))));
        assert!(matches!(s.row(2), Some(ListItem::Leaf(_))));
        assert!(s.row(3).is_none());
        assert_eq!(s.position(&NodeId::new("/a/f")), Some(2));
    }

    #[test]
    fn test_rows_without_up_item() {
        let s = screen(false);
        let rows = s.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description().label, "d");
        assert_eq!(rows[1].node().unwrap().id.as_str(), "/a/f");
        assert_eq!(s.position(&NodeId::new("/a/d")), Some(0));
    }
}
