//! Navigation stack with captured scroll positions
//!
//! Each descent pushes the container being left together with the scroll
//! position the host reported for it; going back pops it so the previous
//! screen can be rebuilt where the user left it. The root is never on the
//! stack: it is the initial anchor.

use super::error::{PickerError, Result};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// Host-reported list position
///
/// Opaque to the engine: it is stored on push and handed back on pop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    /// Index of the first visible row
    pub first_visible: usize,
    /// Pixel/cell offset of that row inside the viewport
    pub offset: i32,
}

impl ScrollOffset {
    /// Offset with `first_visible` row at the top
    #[must_use]
    pub const fn at(first_visible: usize) -> Self {
        Self {
            first_visible,
            offset: 0,
        }
    }
}

/// One visited container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationFrame {
    pub node: Node,
    pub scroll: ScrollOffset,
}

/// Stack of visited containers, optionally capped in depth
#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    frames: Vec<NavigationFrame>,
    max_depth: Option<usize>,
}

impl NavigationStack {
    /// Unbounded stack
    #[must_use]
    pub const fn new() -> Self {
        Self {
            frames: Vec::new(),
            max_depth: None,
        }
    }

    /// Stack refusing pushes beyond `max_depth` frames
    #[must_use]
    pub const fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Check whether one more frame fits
    ///
    /// # Errors
    ///
    /// Returns `PickerError::NavigationBounds` when the stack is full.
    pub fn ensure_room(&self) -> Result<()> {
        match self.max_depth {
            Some(max_depth) if self.frames.len() >= max_depth => {
                Err(PickerError::NavigationBounds { max_depth })
            }
            _ => Ok(()),
        }
    }

    /// Push a frame
    ///
    /// # Errors
    ///
    /// Returns `PickerError::NavigationBounds` when the stack is full.
    pub fn push(&mut self, frame: NavigationFrame) -> Result<()> {
        self.ensure_room()?;
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<NavigationFrame> {
        self.frames.pop()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&NavigationFrame> {
        self.frames.last()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub const fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Visited containers from the root down
    pub fn breadcrumbs(&self) -> impl Iterator<Item = &Node> {
        self.frames.iter().map(|frame| &frame.node)
    }
}
