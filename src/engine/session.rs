//! Picker engine state machine
//!
//! [`PickerEngine`] ties a [`NodeProvider`] to the navigation stack, the
//! comparator and the selection policy. It never renders anything: every
//! change is reported through the [`PickerObserver`] it was built with.
//!
//! # States
//!
//! ```text
//! Idle --open--> Browsing(root)
//! Browsing(a) --activate(container c)--> Browsing(c)        push a
//! Browsing(a) --go_back-->               Browsing(parent)   pop
//! Browsing(a) --go_back, empty stack-->  Closed(cancelled)
//! Browsing(a) --commit-->                Closed             emits picked
//! Browsing(a) --cancel-->                Closed(cancelled)
//! ```
//!
//! Selection is orthogonal to browsing and survives every navigation step.
//! Navigation is all-or-nothing: the next screen is fully built before the
//! stack or the anchor change, so a provider failure leaves the previous
//! screen active.

use tracing::{debug, warn};

use super::error::{PickerError, Result};
use super::navigation::{NavigationFrame, NavigationStack, ScrollOffset};
use super::observer::{NoopObserver, PickerObserver};
use super::screen::{ListItem, Screen, UpItem};
use super::selection::{Selection, SelectionPolicy};
use super::sort::{SortPolicy, sort_nodes};
use crate::config::PickerConfig;
use crate::node::{Node, NodeId, SortField};
use crate::provider::NodeProvider;

/// Lifecycle of one picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// Created, not opened yet
    #[default]
    Idle,
    /// A screen is active
    Browsing,
    /// Committed (`cancelled == false`) or dismissed
    Closed { cancelled: bool },
}

/// What [`PickerEngine::activate`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Moved into a container
    Descended,
    /// Moved to the parent container
    Ascended,
    /// Leaf toggled; `picked` is its new membership
    Toggled { picked: bool },
    /// One-tap commit closed the picker with this result
    Committed(Vec<Node>),
    /// Row has no action (unselectable leaf)
    Ignored,
}

/// Source-agnostic navigation and selection engine
pub struct PickerEngine<P: NodeProvider, O: PickerObserver = NoopObserver> {
    provider: P,
    observer: O,
    config: PickerConfig,
    policy: SelectionPolicy,
    stack: NavigationStack,
    selection: Selection,
    screen: Option<Screen>,
    scroll: ScrollOffset,
    state: EngineState,
}

impl<P: NodeProvider> PickerEngine<P> {
    /// Engine without an observer
    #[must_use]
    pub fn without_observer(provider: P, config: PickerConfig) -> Self {
        Self::new(provider, NoopObserver, config)
    }
}

impl<P: NodeProvider, O: PickerObserver> PickerEngine<P, O> {
    #[must_use]
    pub fn new(provider: P, observer: O, config: PickerConfig) -> Self {
        Self {
            provider,
            observer,
            policy: SelectionPolicy::new(config.selection_mode),
            stack: NavigationStack::with_max_depth(config.max_depth),
            config,
            selection: Selection::new(),
            screen: None,
            scroll: ScrollOffset::default(),
            state: EngineState::Idle,
        }
    }

    /// Open at the provider's root
    ///
    /// # Errors
    ///
    /// Returns `PickerError::InvalidRoot` if the provider has no usable root,
    /// see [`PickerEngine::open_at`].
    pub fn open(&mut self) -> Result<&Screen> {
        self.ensure_not_closed()?;
        let root = self.provider.root().map_err(|e| {
            warn!(error = %e, "provider has no root");
            PickerError::InvalidRoot(e.to_string())
        })?;
        self.open_at(root)
    }

    /// Open with `root` as the first anchor
    ///
    /// Resets the stack and the selection.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::InvalidRoot` if `root` is not a container, lies
    /// outside the root boundary, or cannot be enumerated.
    /// Returns `PickerError::Closed` after commit or cancel.
    pub fn open_at(&mut self, root: Node) -> Result<&Screen> {
        self.ensure_not_closed()?;
        if !root.is_container() {
            return Err(PickerError::InvalidRoot(format!(
                "'{}' is not a container",
                root.id
            )));
        }
        if let Some(boundary) = self.boundary() {
            if !self.provider.is_within(&root.id, &boundary) {
                return Err(PickerError::InvalidRoot(format!(
                    "'{}' is outside '{boundary}'",
                    root.id
                )));
            }
        }

        let screen = self.build_screen(root, ScrollOffset::default()).map_err(|e| {
            warn!(error = %e, "root cannot be enumerated");
            PickerError::InvalidRoot(e.to_string())
        })?;

        debug!(anchor = %screen.anchor.id, items = screen.items.len(), "picker opened");
        self.stack.clear();
        self.selection = Selection::new();
        self.scroll = ScrollOffset::default();
        self.state = EngineState::Browsing;
        Ok(self.show(screen))
    }

    /// Act on a row the user tapped
    ///
    /// # Errors
    ///
    /// Propagates navigation and commit errors; the previous screen stays
    /// active on failure.
    pub fn activate(&mut self, item: &ListItem) -> Result<Activation> {
        self.current()?;
        match item {
            ListItem::Up(_) => {
                if self.stack.is_empty() {
                    self.ascend()?;
                } else {
                    self.pop_frame()?;
                }
                Ok(Activation::Ascended)
            }
            ListItem::Container(node) => {
                self.descend(node.clone())?;
                Ok(Activation::Descended)
            }
            ListItem::Leaf(node) if node.selectable => {
                if self.config.one_tap_commit && self.selection.is_empty() {
                    self.selection = self.policy.apply(&self.selection, node, false);
                    return self.commit().map(Activation::Committed);
                }
                let picked = self.toggle(node)?;
                Ok(Activation::Toggled { picked })
            }
            ListItem::Leaf(_) => Ok(Activation::Ignored),
        }
    }

    /// Activate the row at `index` on the current screen
    ///
    /// # Errors
    ///
    /// Returns `PickerError::UnknownItem` for an index past the last row.
    pub fn activate_row(&mut self, index: usize) -> Result<Activation> {
        let row = self
            .current()?
            .row(index)
            .ok_or(PickerError::UnknownItem(index))?;
        self.activate(&row)
    }

    /// Flip `node`'s membership under the selection mode
    ///
    /// Returns whether the node is picked afterwards.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::NotSelectable` without touching the selection
    /// when the node may not be picked.
    pub fn toggle(&mut self, node: &Node) -> Result<bool> {
        self.current()?;
        if !node.selectable {
            debug!(node = %node.id, "toggle ignored, node not selectable");
            return Err(PickerError::NotSelectable(node.id.clone()));
        }

        let already_picked = self.selection.contains(&node.id);
        self.selection = self.policy.apply(&self.selection, node, already_picked);
        debug!(node = %node.id, picked = self.selection.len(), "selection changed");
        self.observer
            .on_selection_changed(self.selection.len(), self.selection.nodes());
        Ok(!already_picked)
    }

    /// Return to the previously visited container
    ///
    /// With an empty stack the picker closes as cancelled and `None` comes
    /// back.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::AccessDenied` if the previous container can no
    /// longer be enumerated; nothing is popped in that case.
    pub fn go_back(&mut self) -> Result<Option<&Screen>> {
        self.current()?;
        if self.stack.is_empty() {
            self.close(true, Vec::new());
            return Ok(None);
        }
        self.pop_frame()?;
        Ok(self.screen.as_ref())
    }

    /// Move to the anchor's parent
    ///
    /// Pops the stack when it holds a frame; otherwise resolves the parent
    /// through the provider, which is how a picker opened below its root
    /// boundary climbs up.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::AtBoundary` when the anchor has no up-item.
    pub fn ascend(&mut self) -> Result<&Screen> {
        let current = self.current()?;
        if current.up_item.is_none() {
            return Err(PickerError::AtBoundary);
        }
        let anchor = current.anchor.clone();
        if !self.stack.is_empty() {
            self.pop_frame()?;
            return self.current();
        }

        let parent = match self.provider.parent(&anchor) {
            Ok(Some(parent)) => parent,
            Ok(None) => return Err(PickerError::AtBoundary),
            Err(e) => return Err(self.report(PickerError::access_denied(&anchor.id, &e))),
        };
        let screen = match self.build_screen(parent, ScrollOffset::default()) {
            Ok(screen) => screen,
            Err(e) => return Err(self.report(e)),
        };

        debug!(from = %anchor.id, to = %screen.anchor.id, "ascended");
        self.scroll = ScrollOffset::default();
        Ok(self.show(screen))
    }

    /// Close the picker and hand back the picked nodes in pick order
    ///
    /// # Errors
    ///
    /// Returns `PickerError::EmptySelection` when nothing is picked and empty
    /// commits are not allowed.
    pub fn commit(&mut self) -> Result<Vec<Node>> {
        self.current()?;
        if self.selection.is_empty() && !self.config.allow_empty_commit {
            return Err(PickerError::EmptySelection);
        }
        let picked = std::mem::take(&mut self.selection).into_nodes();
        debug!(count = picked.len(), "picker committed");
        self.close(false, picked.clone());
        Ok(picked)
    }

    /// Dismiss the picker without a result
    ///
    /// # Errors
    ///
    /// Returns `PickerError::NotOpen` or `PickerError::Closed` when there is
    /// nothing to dismiss.
    pub fn cancel(&mut self) -> Result<()> {
        self.current()?;
        debug!("picker cancelled");
        self.close(true, Vec::new());
        Ok(())
    }

    /// Re-read the current anchor's children
    ///
    /// The stack, the selection and the scroll position are kept.
    ///
    /// # Errors
    ///
    /// Returns `PickerError::AccessDenied` if the anchor can no longer be
    /// enumerated; the stale screen stays active.
    pub fn reload(&mut self) -> Result<&Screen> {
        let anchor = self.current()?.anchor.clone();
        let screen = match self.build_screen(anchor, self.scroll) {
            Ok(screen) => screen,
            Err(e) => return Err(self.report(e)),
        };
        Ok(self.show(screen))
    }

    /// Change the sibling ordering and re-sort the current screen
    ///
    /// # Errors
    ///
    /// Returns the reload error, in which case the previous ordering is
    /// restored.
    pub fn set_sort(&mut self, sort: Option<SortPolicy>) -> Result<()> {
        self.ensure_not_closed()?;
        let previous = std::mem::replace(&mut self.config.sort, sort);
        if self.state == EngineState::Browsing {
            if let Err(e) = self.reload() {
                self.config.sort = previous;
                return Err(e);
            }
        }
        debug!(?sort, "sort changed");
        Ok(())
    }

    /// Sort on `field`, flipping the direction if it is already the field
    ///
    /// # Errors
    ///
    /// See [`PickerEngine::set_sort`].
    pub fn cycle_sort(&mut self, field: SortField) -> Result<SortPolicy> {
        let next = self.config.sort.map_or_else(
            || SortPolicy::new(field, SortPolicy::default_direction(field)),
            |current| current.cycle(field),
        );
        self.set_sort(Some(next))?;
        Ok(next)
    }

    /// Record where the host's list is scrolled to
    ///
    /// Captured into the navigation frame on the next descent.
    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = scroll;
        if let Some(screen) = self.screen.as_mut() {
            screen.scroll = scroll;
        }
    }

    #[must_use]
    pub const fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    #[must_use]
    pub const fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    #[must_use]
    pub fn is_picked(&self, id: &NodeId) -> bool {
        self.selection.contains(id)
    }

    #[must_use]
    pub const fn state(&self) -> EngineState {
        self.state
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    #[must_use]
    pub const fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    #[must_use]
    pub const fn config(&self) -> &PickerConfig {
        &self.config
    }

    #[must_use]
    pub const fn sort(&self) -> Option<SortPolicy> {
        self.config.sort
    }

    #[must_use]
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    pub const fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutable provider access; call [`PickerEngine::reload`] afterwards
    pub const fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Whether the commit action should be enabled
    #[must_use]
    pub fn can_commit(&self) -> bool {
        self.state == EngineState::Browsing
            && (self.config.allow_empty_commit || !self.selection.is_empty())
    }

    /// Commit action label, with the pick count once more than one is picked
    ///
    /// ```
    /// # use treepick::engine::PickerEngine;
    /// # use treepick::config::PickerConfig;
    /// # use treepick::provider::{JsonProvider, JsonProviderConfig};
    /// let provider = JsonProvider::from_json(
    ///     r#"{"title": "root", "children": []}"#,
    ///     JsonProviderConfig::default(),
    /// ).unwrap();
    /// let engine = PickerEngine::without_observer(provider, PickerConfig::default());
    /// assert_eq!(engine.commit_label("Select"), "Select");
    /// ```
    #[must_use]
    pub fn commit_label(&self, base: &str) -> String {
        match self.selection.len() {
            n if n > 1 => format!("{base} ({n})"),
            _ => base.to_string(),
        }
    }

    fn ensure_not_closed(&self) -> Result<()> {
        match self.state {
            EngineState::Closed { .. } => Err(PickerError::Closed),
            EngineState::Idle | EngineState::Browsing => Ok(()),
        }
    }

    fn current(&self) -> Result<&Screen> {
        match self.state {
            EngineState::Idle => Err(PickerError::NotOpen),
            EngineState::Closed { .. } => Err(PickerError::Closed),
            EngineState::Browsing => self.screen.as_ref().ok_or(PickerError::NotOpen),
        }
    }

    fn boundary(&self) -> Option<NodeId> {
        self.config
            .root_boundary
            .clone()
            .or_else(|| self.provider.boundary())
    }

    fn up_item_for(&self, anchor: &Node) -> Option<UpItem> {
        let parent = anchor.parent.clone()?;
        if let Some(boundary) = self.boundary() {
            if anchor.id == boundary || !self.provider.is_within(&parent, &boundary) {
                return None;
            }
        }
        Some(UpItem {
            target: parent,
            description: self.provider.up_description(),
        })
    }

    /// Fetch, filter and sort the children of `anchor` without touching state
    fn build_screen(&self, anchor: Node, scroll: ScrollOffset) -> Result<Screen> {
        let mut items = self
            .provider
            .children(&anchor)
            .map_err(|e| PickerError::access_denied(&anchor.id, &e))?;
        sort_nodes(&mut items, self.config.sort.as_ref());

        Ok(Screen {
            header: self.provider.header(&anchor),
            up_item: self.up_item_for(&anchor),
            anchor,
            items,
            scroll,
        })
    }

    fn descend(&mut self, node: Node) -> Result<()> {
        self.stack.ensure_room()?;
        let screen = match self.build_screen(node, ScrollOffset::default()) {
            Ok(screen) => screen,
            Err(e) => return Err(self.report(e)),
        };
        let left = self.current()?.anchor.clone();

        self.stack.push(NavigationFrame {
            node: left,
            scroll: self.scroll,
        })?;
        debug!(anchor = %screen.anchor.id, depth = self.stack.depth(), "descended");
        self.scroll = ScrollOffset::default();
        self.show(screen);
        Ok(())
    }

    fn pop_frame(&mut self) -> Result<()> {
        let Some(frame) = self.stack.peek().cloned() else {
            return Err(PickerError::AtBoundary);
        };
        let screen = match self.build_screen(frame.node, frame.scroll) {
            Ok(screen) => screen,
            Err(e) => return Err(self.report(e)),
        };

        self.stack.pop();
        debug!(anchor = %screen.anchor.id, depth = self.stack.depth(), "went back");
        self.scroll = frame.scroll;
        self.show(screen);
        Ok(())
    }

    fn show(&mut self, screen: Screen) -> &Screen {
        self.observer.on_screen_changed(&screen);
        self.screen.insert(screen)
    }

    /// Forward an access failure to the observer before returning it
    fn report(&mut self, err: PickerError) -> PickerError {
        if let PickerError::AccessDenied { id, reason } = &err {
            warn!(node = %id, %reason, "access denied");
            self.observer.on_access_denied(id, reason);
        }
        err
    }

    fn close(&mut self, cancelled: bool, result: Vec<Node>) {
        self.state = EngineState::Closed { cancelled };
        self.stack.clear();
        self.screen = None;
        self.selection = Selection::new();
        self.scroll = ScrollOffset::default();
        self.observer.on_closed(cancelled, &result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::observer::{EventLog, PickerEvent};
    use crate::engine::selection::SelectionMode;
    use crate::engine::sort::SortDirection;
    use crate::testing::TreeProvider;

    fn tree() -> TreeProvider {
        TreeProvider::new()
            .file("/b.txt")
            .dir("/A")
            .file("/A/file1")
            .file("/A/zeta")
            .dir("/B")
            .file("/B/file2")
            .dir("/B/deep")
            .locked_file("/readme")
    }

    fn engine(config: PickerConfig) -> PickerEngine<TreeProvider, EventLog> {
        PickerEngine::new(tree(), EventLog::new(), config)
    }

    fn sorted() -> PickerConfig {
        PickerConfig::new().with_sort(Some(SortPolicy::default()))
    }

    fn labels(screen: &Screen) -> Vec<&str> {
        screen.items.iter().map(Node::label).collect()
    }

    fn screen_changes(log: &EventLog) -> usize {
        log.count(|e| matches!(e, PickerEvent::ScreenChanged { .. }))
    }

    fn row_of(engine: &PickerEngine<TreeProvider, EventLog>, id: &str) -> ListItem {
        let screen = engine.screen().unwrap();
        let index = screen.position(&NodeId::new(id)).unwrap();
        screen.row(index).unwrap()
    }

    #[test]
    fn test_open_orders_containers_first() {
        let mut engine = engine(sorted());
        let screen = engine.open().unwrap();

        assert_eq!(labels(screen), vec!["A", "B", "b.txt", "readme"]);
        assert!(screen.up_item.is_none());
        assert_eq!(engine.state(), EngineState::Browsing);
        assert_eq!(screen_changes(engine.observer()), 1);
    }

    #[test]
    fn test_open_without_sort_keeps_provider_order() {
        let mut engine = engine(PickerConfig::new());
        let screen = engine.open().unwrap();
        assert_eq!(labels(screen), vec!["b.txt", "A", "B", "readme"]);
    }

    #[test]
    fn test_open_rejects_leaf_and_unreadable_root() {
        let mut e = engine(sorted());
        let leaf = e.provider().node("/b.txt");
        assert!(matches!(e.open_at(leaf), Err(PickerError::InvalidRoot(_))));

        let mut provider = tree();
        provider.deny("/");
        let mut e = PickerEngine::new(provider, EventLog::new(), sorted());
        assert!(matches!(e.open(), Err(PickerError::InvalidRoot(_))));
        assert_eq!(e.state(), EngineState::Idle);
    }

    #[test]
    fn test_open_rejects_root_outside_boundary() {
        let mut e = engine(sorted().with_root_boundary("/B"));
        let a = e.provider().node("/A");
        assert!(matches!(e.open_at(a), Err(PickerError::InvalidRoot(_))));
    }

    #[test]
    fn test_descend_and_back_restores_screen_and_scroll() {
        let mut e = engine(sorted());
        let before = e.open().unwrap().clone();
        e.set_scroll(ScrollOffset { first_visible: 2, offset: -7 });

        let outcome = e.activate(&row_of(&e, "/B")).unwrap();
        assert_eq!(outcome, Activation::Descended);
        let inside = e.screen().unwrap();
        assert_eq!(inside.anchor.id.as_str(), "/B");
        assert_eq!(labels(inside), vec!["deep", "file2"]);
        assert!(inside.up_item.is_some());
        assert_eq!(e.depth(), 1);

        let back = e.go_back().unwrap().unwrap().clone();
        assert_eq!(back.anchor, before.anchor);
        assert_eq!(back.items, before.items);
        assert_eq!(back.scroll, ScrollOffset { first_visible: 2, offset: -7 });
        assert_eq!(e.scroll(), back.scroll);
        assert_eq!(e.depth(), 0);
    }

    #[test]
    fn test_up_item_pops_the_stack() {
        let mut e = engine(sorted());
        e.open().unwrap();
        e.activate(&row_of(&e, "/B")).unwrap();
        e.activate(&row_of(&e, "/B/deep")).unwrap();
        assert_eq!(e.depth(), 2);

        let up = e.screen().unwrap().row(0).unwrap();
        assert!(matches!(up, ListItem::Up(_)));
        assert_eq!(e.activate(&up).unwrap(), Activation::Ascended);
        assert_eq!(e.screen().unwrap().anchor.id.as_str(), "/B");
        assert_eq!(e.depth(), 1);
    }

    #[test]
    fn test_deep_descent_unwinds_every_level() {
        const DEPTH: usize = 4;
        let mut provider = TreeProvider::new();
        let mut path = String::new();
        for level in 0..DEPTH {
            path.push_str(&format!("/d{level}"));
            provider = provider
                .dir(&path)
                .file(&format!("{path}/z{level}"))
                .file(&format!("{path}/a{level}"));
        }
        let mut e = PickerEngine::new(provider, EventLog::new(), sorted());
        e.open().unwrap();

        let mut visited = Vec::new();
        for level in 0..DEPTH {
            let scroll = ScrollOffset {
                first_visible: level + 1,
                offset: -3 * i32::try_from(level).unwrap(),
            };
            e.set_scroll(scroll);
            let screen = e.screen().unwrap().clone();
            visited.push((screen.anchor.id.clone(), screen.items.clone(), scroll));

            let next = screen.items.iter().find(|n| n.is_container()).unwrap().clone();
            e.activate(&ListItem::Container(next)).unwrap();
            assert_eq!(e.depth(), level + 1);
        }

        while let Some((anchor, items, scroll)) = visited.pop() {
            let back = e.go_back().unwrap().unwrap();
            assert_eq!(back.anchor.id, anchor);
            assert_eq!(back.items, items);
            assert_eq!(back.scroll, scroll);
            assert_eq!(e.scroll(), scroll);
            assert_eq!(e.depth(), visited.len());
        }
        assert!(e.go_back().unwrap().is_none());
    }

    #[test]
    fn test_go_back_on_empty_stack_closes_cancelled() {
        let mut e = engine(sorted());
        e.open().unwrap();

        assert!(e.go_back().unwrap().is_none());
        assert_eq!(e.state(), EngineState::Closed { cancelled: true });
        assert_eq!(
            e.observer().last(),
            Some(&PickerEvent::Closed { cancelled: true, result: vec![] })
        );
        assert!(matches!(e.go_back(), Err(PickerError::Closed)));
    }

    #[test]
    fn test_single_mode_replaces_pick() {
        let mut e = engine(sorted());
        e.open().unwrap();
        let b = e.provider().node("/b.txt");
        e.activate(&row_of(&e, "/A")).unwrap();
        let x = e.provider().node("/A/file1");

        assert!(e.toggle(&x).unwrap());
        assert!(e.toggle(&b).unwrap());
        let ids: Vec<_> = e.selection().ids().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["/b.txt"]);
    }

    #[test]
    fn test_multi_selection_survives_navigation() {
        let mut e = engine(sorted().with_mode(SelectionMode::Multi));
        e.open().unwrap();

        e.activate(&row_of(&e, "/A")).unwrap();
        assert_eq!(
            e.activate(&row_of(&e, "/A/file1")).unwrap(),
            Activation::Toggled { picked: true }
        );
        e.go_back().unwrap();
        e.activate(&row_of(&e, "/B")).unwrap();
        e.activate(&row_of(&e, "/B/file2")).unwrap();
        assert_eq!(e.commit_label("Select"), "Select (2)");

        let result = e.commit().unwrap();
        let ids: Vec<_> = result.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["/A/file1", "/B/file2"]);
        assert_eq!(e.state(), EngineState::Closed { cancelled: false });
        assert!(e.screen().is_none());
        assert_eq!(e.depth(), 0);
    }

    #[test]
    fn test_toggle_unselectable_is_rejected_without_change() {
        let mut e = engine(sorted());
        e.open().unwrap();
        let b = e.provider().node("/b.txt");
        e.toggle(&b).unwrap();
        let before = e.selection().clone();
        let events = e.observer().events.len();

        let locked = e.provider().node("/readme");
        assert!(matches!(e.toggle(&locked), Err(PickerError::NotSelectable(_))));
        assert_eq!(e.activate(&row_of(&e, "/readme")).unwrap(), Activation::Ignored);
        assert_eq!(e.selection(), &before);
        assert_eq!(e.observer().events.len(), events);
    }

    #[test]
    fn test_access_denied_keeps_previous_screen() {
        let mut e = engine(sorted());
        e.open().unwrap();
        e.provider_mut().deny("/B");
        let before = e.screen().unwrap().clone();
        let screens = screen_changes(e.observer());

        let err = e.activate(&row_of(&e, "/B")).unwrap_err();
        assert!(matches!(err, PickerError::AccessDenied { .. }));
        assert_eq!(e.screen(), Some(&before));
        assert_eq!(e.depth(), 0);
        assert_eq!(screen_changes(e.observer()), screens);
        assert_eq!(
            e.observer()
                .count(|ev| matches!(ev, PickerEvent::AccessDenied { .. })),
            1
        );
    }

    #[test]
    fn test_back_into_denied_container_keeps_stack() {
        let mut e = engine(sorted());
        e.open().unwrap();
        e.activate(&row_of(&e, "/B")).unwrap();
        e.provider_mut().deny("/");

        assert!(matches!(e.go_back(), Err(PickerError::AccessDenied { .. })));
        assert_eq!(e.depth(), 1);
        assert_eq!(e.screen().unwrap().anchor.id.as_str(), "/B");

        e.provider_mut().allow("/");
        assert!(e.go_back().unwrap().is_some());
    }

    #[test]
    fn test_reload_picks_up_changes_and_keeps_state() {
        let mut e = engine(sorted().with_mode(SelectionMode::Multi));
        e.open().unwrap();
        e.activate(&row_of(&e, "/A")).unwrap();
        e.activate(&row_of(&e, "/A/file1")).unwrap();

        let provider = std::mem::take(e.provider_mut()).file("/A/new");
        *e.provider_mut() = provider;
        let screen = e.reload().unwrap();
        assert_eq!(labels(screen), vec!["file1", "new", "zeta"]);
        assert_eq!(e.depth(), 1);
        assert_eq!(e.selection().len(), 1);
    }

    #[test]
    fn test_reload_failure_reports_once() {
        let mut e = engine(sorted());
        e.open().unwrap();
        e.provider_mut().deny("/");
        let screens = screen_changes(e.observer());

        assert!(e.reload().is_err());
        assert_eq!(screen_changes(e.observer()), screens);
        assert!(e.screen().is_some());
    }

    #[test]
    fn test_one_tap_commit_skips_selection_event() {
        let mut e = engine(sorted().with_one_tap_commit(true));
        e.open().unwrap();

        let outcome = e.activate(&row_of(&e, "/b.txt")).unwrap();
        assert!(matches!(outcome, Activation::Committed(ref nodes) if nodes.len() == 1));
        assert_eq!(
            e.observer()
                .count(|ev| matches!(ev, PickerEvent::SelectionChanged { .. })),
            0
        );
        assert_eq!(
            e.observer().last(),
            Some(&PickerEvent::Closed {
                cancelled: false,
                result: vec![NodeId::new("/b.txt")],
            })
        );
    }

    #[test]
    fn test_commit_requires_selection() {
        let mut e = engine(sorted());
        e.open().unwrap();
        assert!(!e.can_commit());
        assert!(matches!(e.commit(), Err(PickerError::EmptySelection)));
        assert_eq!(e.state(), EngineState::Browsing);

        let mut lenient = engine(sorted().with_allow_empty_commit(true));
        lenient.open().unwrap();
        assert!(lenient.can_commit());
        assert!(lenient.commit().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_closes_and_blocks_everything() {
        let mut e = engine(sorted());
        e.open().unwrap();
        let b = e.provider().node("/b.txt");
        e.toggle(&b).unwrap();
        e.cancel().unwrap();

        assert_eq!(e.state(), EngineState::Closed { cancelled: true });
        assert!(e.selection().is_empty());
        assert!(matches!(e.toggle(&b), Err(PickerError::Closed)));
        assert!(matches!(e.reload(), Err(PickerError::Closed)));
        assert!(matches!(e.open(), Err(PickerError::Closed)));
        assert!(matches!(e.commit(), Err(PickerError::Closed)));
        assert!(!e.can_commit());
    }

    #[test]
    fn test_operations_before_open() {
        let mut e = engine(sorted());
        assert!(matches!(e.reload(), Err(PickerError::NotOpen)));
        assert!(matches!(e.activate_row(0), Err(PickerError::NotOpen)));
        assert!(e.set_sort(None).is_ok());
    }

    #[test]
    fn test_max_depth_refuses_descent() {
        let mut e = engine(sorted().with_max_depth(Some(1)));
        e.open().unwrap();
        e.activate(&row_of(&e, "/B")).unwrap();

        let err = e.activate(&row_of(&e, "/B/deep")).unwrap_err();
        assert!(matches!(err, PickerError::NavigationBounds { max_depth: 1 }));
        assert_eq!(e.screen().unwrap().anchor.id.as_str(), "/B");
    }

    #[test]
    fn test_activate_row_out_of_range() {
        let mut e = engine(sorted());
        e.open().unwrap();
        assert!(matches!(e.activate_row(99), Err(PickerError::UnknownItem(99))));
    }

    #[test]
    fn test_ascend_from_start_below_boundary() {
        let provider = tree().starting_at("/B/deep");
        let mut e = PickerEngine::new(provider, EventLog::new(), sorted());
        let screen = e.open().unwrap();
        assert!(screen.up_item.is_some());

        let up = screen.row(0).unwrap();
        assert_eq!(e.activate(&up).unwrap(), Activation::Ascended);
        assert_eq!(e.screen().unwrap().anchor.id.as_str(), "/B");
        assert_eq!(e.depth(), 0);

        e.ascend().unwrap();
        assert_eq!(e.screen().unwrap().anchor.id.as_str(), "/");
        assert!(matches!(e.ascend(), Err(PickerError::AtBoundary)));
    }

    #[test]
    fn test_config_boundary_hides_up_item() {
        let provider = tree().starting_at("/B");
        let mut e = PickerEngine::new(provider, EventLog::new(), sorted().with_root_boundary("/B"));
        let screen = e.open().unwrap();
        assert!(screen.up_item.is_none());

        e.activate(&row_of(&e, "/B/deep")).unwrap();
        assert!(e.screen().unwrap().up_item.is_some());
    }

    #[test]
    fn test_cycle_sort_resorts_current_screen() {
        let provider = TreeProvider::new()
            .file_sized("/small", 1)
            .file_sized("/big", 100)
            .dir("/dir");
        let mut e = PickerEngine::new(provider, EventLog::new(), sorted());
        e.open().unwrap();

        let policy = e.cycle_sort(SortField::Size).unwrap();
        assert_eq!(policy, SortPolicy::new(SortField::Size, SortDirection::Reverse));
        assert_eq!(labels(e.screen().unwrap()), vec!["dir", "big", "small"]);

        e.cycle_sort(SortField::Size).unwrap();
        assert_eq!(labels(e.screen().unwrap()), vec!["dir", "small", "big"]);

        e.set_sort(None).unwrap();
        assert_eq!(labels(e.screen().unwrap()), vec!["small", "big", "dir"]);
        assert!(e.sort().is_none());
    }

    #[test]
    fn test_failed_resort_restores_policy() {
        let mut e = engine(sorted());
        e.open().unwrap();
        e.provider_mut().deny("/");

        assert!(e.set_sort(None).is_err());
        assert_eq!(e.sort(), Some(SortPolicy::default()));
    }

    #[test]
    fn test_selectable_container_descends_on_activate_and_toggles_explicitly() {
        let provider = TreeProvider::new().selectable_dir("/photos").file("/photos/a.png");
        let mut e = PickerEngine::new(provider, EventLog::new(), sorted());
        e.open().unwrap();
        let photos = e.provider().node("/photos");

        assert!(e.toggle(&photos).unwrap());
        assert_eq!(e.activate(&row_of(&e, "/photos")).unwrap(), Activation::Descended);
        assert!(e.is_picked(&photos.id));
    }
}
