//! # Rewire's render boundary
//!
//! Everything the reactive core hands a rendering host:
//!
//! - [`Component`] — the closed, serializable widget-description sum type,
//!   lowered to a [`Node`] tree by an exhaustive dispatcher.
//! - [`Root`] — a mounted reactive region: pull-based `render()`, scope-tied
//!   teardown.
//! - [`RowStateManager`] — per-row visibility/loading state for virtualized
//!   lists, with debounced transitions and capacity-bounded eviction.
//! - [`ViewportTracker`] / [`visible_range`] — the glue from scroll position
//!   to row manager calls.
//!
//! A typical host loop:
//!
//! ```rust
//! use rewire_core::Store;
//! use rewire_ui::{Component, Root};
//!
//! let store = Store::new();
//! store.write("counter", 0i64);
//!
//! let root = Root::mount({
//!     let store = store.clone();
//!     move || Component::Text {
//!         content: format!("count = {}", store.read_as::<i64>("counter").unwrap()),
//!     }
//! });
//!
//! let frame = root.render().render(); // description, then render tree
//! assert_eq!(frame.text.as_deref(), Some("count = 0"));
//!
//! store.write("counter", 1i64);
//! assert!(root.is_dirty());
//! ```

pub mod boundary;
pub mod component;
pub mod root;
pub mod rows;
pub mod tests;
pub mod viewport;

pub use boundary::{RenderPanic, catch_render};
pub use component::{Choice, Component, GanttTask, HandlerId, Node, Role, Series, Side, Tone};
pub use root::Root;
pub use rows::{
    ListenerId, ReloadPolicy, RowError, RowKey, RowManagerConfig, RowRecord, RowStateManager,
    RowStatus,
};
pub use viewport::{ViewportTracker, VisibleRange, visible_range};
