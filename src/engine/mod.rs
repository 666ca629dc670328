//! Picker engine
//!
//! The source-agnostic core: ordering siblings, remembering where the user
//! came from, and keeping the picked set consistent with the selection mode.
//!
//! # Components
//!
//! - [`sort`]: comparator policy over [`Node`](crate::node::Node) sort keys
//! - [`navigation`]: stack of visited containers with scroll positions
//! - [`selection`]: pure single/multi toggle rule
//! - [`screen`]: materialized rows of one container
//! - [`observer`]: callbacks the host subscribes to
//! - [`session`]: the [`PickerEngine`] state machine driving all of the above

pub mod error;
pub mod navigation;
pub mod observer;
pub mod screen;
pub mod selection;
pub mod session;
pub mod sort;

pub use error::{PickerError, Result};
pub use navigation::{NavigationFrame, NavigationStack, ScrollOffset};
pub use observer::{EventLog, NoopObserver, PickerEvent, PickerObserver};
pub use screen::{ListItem, Screen, UpItem};
pub use selection::{Selection, SelectionMode, SelectionPolicy};
pub use session::{Activation, EngineState, PickerEngine};
pub use sort::{SortDirection, SortPolicy, compare, sort_nodes};
