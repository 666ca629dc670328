//! Node model shared by every picker source
//!
//! A [`Node`] is the uniform wrapper the engine works with. Providers build
//! nodes on demand when a container is expanded; the engine never looks at
//! provider payloads, only at the facts recorded here.
//!
//! # Design
//!
//! - **Non-owning parents**: `parent` is an id, resolved through the provider
//! - **Pre-computed facts**: labels, icon and sort keys are filled in by the
//!   provider when the node is created
//! - **Immutable once handed out**: the engine keeps its own bookkeeping
//!   (picked membership, scroll offsets) outside of the node

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Provider-defined opaque handle
///
/// Absolute path for the filesystem source, JSON pointer for the JSON source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create an id from any string-like value
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create an id from a filesystem path
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    /// Borrow the raw id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Whether a node can be descended into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Directory, or JSON object with a non-empty children array
    Container,
    /// Anything without descendable children
    Leaf,
}

/// Icon hint handed to the host, which owns the actual artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconKey {
    Folder,
    #[default]
    File,
    Branch,
    Node,
    Back,
    Header,
}

/// Presentation facts computed by a provider
///
/// The engine copies these around but never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description {
    /// Main row text
    pub label: String,
    /// Secondary row text (may be empty)
    pub secondary_label: String,
    /// Icon hint
    pub icon: IconKey,
}

impl Description {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        secondary_label: impl Into<String>,
        icon: IconKey,
    ) -> Self {
        Self {
            label: label.into(),
            secondary_label: secondary_label.into(),
            icon,
        }
    }
}

/// Named fields a picker can sort on
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortField {
    /// File name
    Name,
    /// Last modification time
    Modified,
    /// Size in bytes
    Size,
    /// Node title (JSON source)
    Title,
    /// Children-first ordering
    HasChildren,
}

impl SortField {
    /// Name used in configuration files and on the command line
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Modified => "modified",
            Self::Size => "size",
            Self::Title => "title",
            Self::HasChildren => "has-children",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparable value a provider supplies for one [`SortField`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    /// Compared case-insensitively
    Text(String),
    /// Compared numerically
    Number(i64),
    /// `false` before `true`
    Flag(bool),
    /// Field does not apply to this node; sorts before everything else
    Missing,
}

impl SortKey {
    const fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Flag(_) => 1,
            Self::Number(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order over keys: text is case-insensitive, numbers numeric,
    /// and mixed variants fall back to a fixed variant rank.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Uniform wrapper around one provider entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Provider handle
    pub id: NodeId,
    /// Id of the node this one was produced from (`None` for a top root)
    pub parent: Option<NodeId>,
    /// Container or leaf
    pub kind: NodeKind,
    /// Whether the node may enter the selection set
    pub selectable: bool,
    /// Labels and icon
    pub description: Description,
    /// Sort keys supplied by the provider
    pub keys: BTreeMap<SortField, SortKey>,
}

impl Node {
    /// Create a container node
    #[must_use]
    pub fn container(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self::with_kind(id.into(), label.into(), NodeKind::Container, IconKey::Folder)
    }

    /// Create a leaf node (selectable by default)
    #[must_use]
    pub fn leaf(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        let mut node = Self::with_kind(id.into(), label.into(), NodeKind::Leaf, IconKey::File);
        node.selectable = true;
        node
    }

    fn with_kind(id: NodeId, label: String, kind: NodeKind, icon: IconKey) -> Self {
        Self {
            id,
            parent: None,
            kind,
            selectable: false,
            description: Description::new(label, "", icon),
            keys: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[must_use]
    pub const fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
        self.description.secondary_label = secondary.into();
        self
    }

    #[must_use]
    pub const fn with_icon(mut self, icon: IconKey) -> Self {
        self.description.icon = icon;
        self
    }

    /// Record the value used when sorting on `field`
    #[must_use]
    pub fn with_key(mut self, field: SortField, key: SortKey) -> Self {
        self.keys.insert(field, key);
        self
    }

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.description.label
    }

    /// Sort key for `field`
    ///
    /// Falls back to the label for name-like fields and to the container flag
    /// for [`SortField::HasChildren`] when the provider supplied nothing.
    #[must_use]
    pub fn sort_key(&self, field: SortField) -> SortKey {
        if let Some(key) = self.keys.get(&field) {
            return key.clone();
        }
        match field {
            SortField::Name | SortField::Title => SortKey::Text(self.label().to_string()),
            SortField::HasChildren => SortKey::Flag(self.is_container()),
            SortField::Modified | SortField::Size => SortKey::Missing,
        }
    }
}
