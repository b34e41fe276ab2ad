//! # Store, Tracking, and Reactive Nodes
//!
//! Rewire's core is a fine-grained re-render engine layered over a
//! key-version store. Three pieces:
//!
//! - [`Store`] — string keys mapped to `(opaque value, version)` pairs, with
//!   per-key push subscriptions.
//! - [`TrackGuard`] — a tracking session: while one is open, every
//!   `Store::read` is recorded into an ordered, de-duplicated access list.
//! - [`ReactiveNode`] — wraps a render computation; each execution captures
//!   its own access list and reconciles subscriptions against it.
//!
//! ## Store
//!
//! ```rust
//! use rewire_core::Store;
//!
//! let store = Store::new();
//! store.write("counter", 0i64);
//! assert_eq!(store.read_as::<i64>("counter").unwrap(), 0);
//! assert_eq!(store.get_version("counter"), 1);
//!
//! store.write("counter", 1i64);
//! assert_eq!(store.get_version("counter"), 2);
//! ```
//!
//! Versions bump strictly on every write; "did anything change" is a version
//! compare, never a deep equality walk. Writes are synchronous, and a key's
//! subscribers run right after the write commits. `Store::batch` defers and
//! coalesces notifications into one pass per written key.
//!
//! ## Nodes
//!
//! A node discovers its own dependencies by reading — there is no manual
//! declaration:
//!
//! ```rust
//! use rewire_core::{ReactiveNode, Store};
//!
//! let store = Store::new();
//! store.write("counter", 0i64);
//!
//! let node = {
//!     let store = store.clone();
//!     ReactiveNode::new(move || format!("{}", store.read_as::<i64>("counter").unwrap()))
//! };
//! assert_eq!(node.execute(), "0");
//!
//! store.write("counter", 1i64);
//! assert!(node.is_dirty());
//! assert_eq!(node.execute(), "1");
//! ```
//!
//! Re-execution is host-driven: a version bump marks the node dirty and fires
//! its `on_invalidate` callback, and the host re-executes when it next
//! renders. A key that a conditional branch stops reading is unsubscribed on
//! the next reconcile — the dependency set is exact, never additive.
//!
//! Nodes nest. An inner node executing inside an outer computation opens its
//! own session, so inner reads are never attributed to the outer node and
//! only the smallest affected subtree re-executes.
//!
//! ## Ownership
//!
//! Stores are passed explicitly into whatever reads them; two stores (UI
//! state and dataset values) commonly coexist. A [`Scope`] ties node teardown
//! to its mount point: disposing the scope releases every subscription
//! synchronously.

pub mod clock;
pub mod node;
pub mod scope;
pub mod store;
pub mod track;
pub mod value;

pub use clock::{Clock, SystemClock, TestClock};
pub use node::ReactiveNode;
pub use scope::{Scope, current_scope, on_cleanup};
pub use store::{Store, StoreId, Subscription};
pub use track::{AccessList, Dep, TrackGuard, is_tracking};
pub use value::{Value, ValueError, decode, encode};
