//! Host callback surface
//!
//! The engine never touches presentation. It reports what changed through a
//! [`PickerObserver`] the host plugs in; every method has a no-op default so
//! a host only implements what it renders.

use super::screen::Screen;
use crate::node::{Node, NodeId};

/// Callbacks fired by the engine after each state change
pub trait PickerObserver {
    /// A new screen is active (open, descend, back, reload, re-sort)
    fn on_screen_changed(&mut self, _screen: &Screen) {}

    /// The picked set changed
    fn on_selection_changed(&mut self, _count: usize, _items: &[Node]) {}

    /// A node could not be enumerated; the previous screen stays active
    fn on_access_denied(&mut self, _node: &NodeId, _reason: &str) {}

    /// Picker closed, either committed with `result` or cancelled
    fn on_closed(&mut self, _cancelled: bool, _result: &[Node]) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PickerObserver for NoopObserver {}

/// Recorded engine notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    ScreenChanged { anchor: NodeId, rows: usize },
    SelectionChanged { picked: Vec<NodeId> },
    AccessDenied { node: NodeId },
    Closed { cancelled: bool, result: Vec<NodeId> },
}

/// Observer that records every notification in order
///
/// Useful for hosts that batch updates and for tests.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<PickerEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events matching `predicate`
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&PickerEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PickerEvent> {
        self.events.last()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PickerObserver for EventLog {
    fn on_screen_changed(&mut self, screen: &Screen) {
        self.events.push(PickerEvent::ScreenChanged {
            anchor: screen.anchor.id.clone(),
            rows: screen.len(),
        });
    }

    fn on_selection_changed(&mut self, _count: usize, items: &[Node]) {
        self.events.push(PickerEvent::SelectionChanged {
            picked: items.iter().map(|node| node.id.clone()).collect(),
        });
    }

    fn on_access_denied(&mut self, node: &NodeId, _reason: &str) {
        self.events.push(PickerEvent::AccessDenied { node: node.clone() });
    }

    fn on_closed(&mut self, cancelled: bool, result: &[Node]) {
        self.events.push(PickerEvent::Closed {
            cancelled,
            result: result.iter().map(|node| node.id.clone()).collect(),
        });
    }
}
