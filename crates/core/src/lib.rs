//! switchback-core: navigation stack data structures.
//!
//! A browser-style navigation history: an ordered list of [`Record`]s with a
//! current-position pointer supporting bidirectional traversal, truncating
//! push, saved sub-stacks keyed by root screen, and a serde persistence
//! model for surviving teardown/recreation.
//!
//! # Public API
//!
//! - [`NavStack`] -- the live, mutable stack
//! - [`Record`] -- one navigable destination with a unique key
//! - [`Snapshot`] -- immutable point-in-time capture for read consumers
//! - [`Direction`], [`StateOptions`] -- traversal and reset policy
//! - [`SavedStack`] / [`SavedSnapshot`] -- persisted representation
//! - [`RestoreError`] -- invalid persisted state

mod error;
mod persist;
mod record;
mod snapshot;
mod stack;

pub use error::RestoreError;
pub use persist::{SavedSnapshot, SavedStack};
pub use record::{Record, Screen};
pub use snapshot::Snapshot;
pub use stack::{Direction, NavStack, StateOptions};
