//! Engine error types
//!
//! Errors produced by [`PickerEngine`](super::PickerEngine) operations. None of
//! them are fatal to the process: a failed navigation leaves the previous
//! screen in place, a refused toggle leaves the selection untouched.
//!
//! # Error Types
//!
//! - **`AccessDenied`**: the provider could not enumerate a node
//! - **`InvalidRoot`**: the picker cannot be opened at all
//! - **`NotSelectable`**: toggle on a node that may not be picked
//! - **`EmptySelection`**: commit with nothing picked
//! - **`NavigationBounds`**: descent past the configured depth cap

use crate::node::NodeId;
use crate::provider::ProviderError;
use thiserror::Error;

/// Errors raised by picker engine operations
#[derive(Debug, Error)]
pub enum PickerError {
    /// Provider refused to enumerate a node; navigation was aborted
    #[error("Access denied to '{id}': {reason}")]
    AccessDenied { id: NodeId, reason: String },

    /// Root is missing, not a container, or not readable
    #[error("Invalid root: {0}")]
    InvalidRoot(String),

    /// Node may not participate in the selection
    #[error("Node '{0}' is not selectable")]
    NotSelectable(NodeId),

    /// Commit attempted while nothing is picked
    #[error("Nothing is selected")]
    EmptySelection,

    /// Navigation stack is at its configured depth cap
    #[error("Navigation depth limit of {max_depth} reached")]
    NavigationBounds { max_depth: usize },

    /// Anchor is already at the root boundary
    #[error("Already at the top of the tree")]
    AtBoundary,

    /// Row index does not exist on the current screen
    #[error("No row at index {0}")]
    UnknownItem(usize),

    /// Operation requires an open picker
    #[error("Picker has not been opened")]
    NotOpen,

    /// Picker was committed or cancelled
    #[error("Picker is closed")]
    Closed,
}

impl PickerError {
    /// Wrap a provider failure for `id` as an access-denied signal
    #[must_use]
    pub fn access_denied(id: &NodeId, err: &ProviderError) -> Self {
        Self::AccessDenied {
            id: id.clone(),
            reason: err.to_string(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, PickerError>;
