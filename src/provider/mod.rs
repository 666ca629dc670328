//! Node providers
//!
//! A provider is the only component that knows what a node really is. The
//! engine asks it for the root, for a container's children and for the
//! parent of a node; everything else travels as [`Node`] facts.
//!
//! # Sources
//!
//! - [`files::FileProvider`]: directories and files on the local filesystem
//! - [`json::JsonProvider`]: titled objects nested through a children array

pub mod error;
pub mod files;
pub mod format;
pub mod json;
pub mod pattern;

pub use error::{PatternError, PatternKind, ProviderError};
pub use files::{FileProvider, FileProviderConfig, FileSelection};
pub use format::FormatConfig;
pub use json::{JsonProvider, JsonProviderConfig, TreeSelection};
pub use pattern::NamePattern;

use crate::node::{Description, IconKey, Node, NodeId};

/// Result type for provider calls
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Source of nodes for the picker engine
///
/// Children come back already filtered (hidden, unreadable, pattern
/// mismatches); the engine never re-filters them, it only sorts.
pub trait NodeProvider {
    /// Node the picker opens at
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if no usable root exists.
    fn root(&self) -> Result<Node>;

    /// Visible children of `node`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::AccessDenied` if `node` cannot be enumerated.
    fn children(&self, node: &Node) -> Result<Vec<Node>>;

    /// Container `node` was produced from, `None` at the top of the source
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` if the parent cannot be resolved.
    fn parent(&self, node: &Node) -> Result<Option<Node>>;

    /// Whether `id` lies at or below `boundary`
    fn is_within(&self, id: &NodeId, boundary: &NodeId) -> bool;

    /// Highest node browsing may ascend to
    fn boundary(&self) -> Option<NodeId> {
        None
    }

    /// Header facts for a screen anchored at `node`
    fn header(&self, node: &Node) -> Description {
        Description::new(node.label(), node.id.as_str(), IconKey::Header)
    }

    /// Facts for the synthetic up-item
    fn up_description(&self) -> Description {
        Description::new("..", "", IconKey::Back)
    }
}

impl<P: NodeProvider + ?Sized> NodeProvider for Box<P> {
    fn root(&self) -> Result<Node> {
        (**self).root()
    }

    fn children(&self, node: &Node) -> Result<Vec<Node>> {
        (**self).children(node)
    }

    fn parent(&self, node: &Node) -> Result<Option<Node>> {
        (**self).parent(node)
    }

    fn is_within(&self, id: &NodeId, boundary: &NodeId) -> bool {
        (**self).is_within(id, boundary)
    }

    fn boundary(&self) -> Option<NodeId> {
        (**self).boundary()
    }

    fn header(&self, node: &Node) -> Description {
        (**self).header(node)
    }

    fn up_description(&self) -> Description {
        (**self).up_description()
    }
}
