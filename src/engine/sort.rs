//! Sibling ordering rules
//!
//! Ordering is lexicographic over these keys, in priority order:
//!
//! 1. For [`SortField::HasChildren`]: nodes with children first, whatever the
//!    direction. The direction only flips the alphabetic title compare that
//!    follows.
//! 2. For every other field: containers before leaves, whatever the direction,
//!    then the field's sort key, negated for [`SortDirection::Reverse`].
//! 3. Case-insensitive label, always ascending.
//! 4. Exact label, then node id, so distinct nodes never compare equal.

use crate::node::{Node, SortField};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction for the field compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Normal,
    Reverse,
}

impl SortDirection {
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Normal => Self::Reverse,
            Self::Reverse => Self::Normal,
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Normal => ordering,
            Self::Reverse => ordering.reverse(),
        }
    }
}

/// Field + direction pair used to order a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPolicy {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl Default for SortPolicy {
    fn default() -> Self {
        Self::new(SortField::Name, SortDirection::Normal)
    }
}

impl SortPolicy {
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Direction picked when switching to `field`
    ///
    /// Time and size start newest/largest first.
    #[must_use]
    pub const fn default_direction(field: SortField) -> SortDirection {
        match field {
            SortField::Modified | SortField::Size => SortDirection::Reverse,
            SortField::Name | SortField::Title | SortField::HasChildren => SortDirection::Normal,
        }
    }

    /// Column-header behaviour: same field flips, new field resets
    #[must_use]
    pub fn cycle(self, field: SortField) -> Self {
        if field == self.field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, Self::default_direction(field))
        }
    }

    #[must_use]
    pub fn compare(&self, a: &Node, b: &Node) -> Ordering {
        compare(a, b, self.field, self.direction)
    }
}

/// Compare two siblings under `field` and `direction`
#[must_use]
pub fn compare(a: &Node, b: &Node, field: SortField, direction: SortDirection) -> Ordering {
    let primary = if field == SortField::HasChildren {
        let children_first = b
            .sort_key(SortField::HasChildren)
            .compare(&a.sort_key(SortField::HasChildren));
        children_first.then_with(|| {
            direction.apply(
                a.sort_key(SortField::Title)
                    .compare(&b.sort_key(SortField::Title)),
            )
        })
    } else {
        b.is_container()
            .cmp(&a.is_container())
            .then_with(|| direction.apply(a.sort_key(field).compare(&b.sort_key(field))))
    };

    primary.then_with(|| tie_break(a, b))
}

fn tie_break(a: &Node, b: &Node) -> Ordering {
    a.label()
        .to_lowercase()
        .cmp(&b.label().to_lowercase())
        .then_with(|| a.label().cmp(b.label()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort `nodes` in place; `None` keeps provider order
pub fn sort_nodes(nodes: &mut [Node], policy: Option<&SortPolicy>) {
    if let Some(policy) = policy {
        nodes.sort_by(|a, b| policy.compare(a, b));
    }
}
