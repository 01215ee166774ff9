//! Navigation records and the screen descriptor bound.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Bound for screen descriptors: the opaque value identifying what a record
/// presents.
///
/// Screens are compared for the duplicate-push guard and used as keys for
/// saved sub-stacks, so they must be cheap value types. Serde bounds are
/// only required by the persistence entry points, not here.
pub trait Screen: Clone + Eq + fmt::Debug + Send + 'static {}

impl<T> Screen for T where T: Clone + Eq + fmt::Debug + Send + 'static {}

/// One navigable destination in a [`NavStack`](crate::NavStack).
///
/// A record pairs a screen descriptor with a globally unique `key` minted at
/// construction. The key never changes for the life of the record and is
/// what retained state and pending results are associated with. Two records
/// may present the same screen with the same args, but never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<S> {
    /// Unique, immutable identity. A ULID string, unique with overwhelming
    /// probability across the process lifetime.
    pub key: String,
    /// The screen this record presents.
    pub screen: S,
    /// Optional parameters for the screen. Heterogeneous by design; readers
    /// are responsible for type-checking on access.
    #[serde(default)]
    pub args: BTreeMap<String, serde_json::Value>,
}

impl<S> Record<S> {
    /// Create a record for `screen` with no args and a fresh key.
    pub fn new(screen: S) -> Self {
        Record::with_args(screen, BTreeMap::new())
    }

    /// Create a record for `screen` with the given args and a fresh key.
    pub fn with_args(screen: S, args: BTreeMap<String, serde_json::Value>) -> Self {
        Record {
            key: Ulid::new().to_string(),
            screen,
            args,
        }
    }

    /// Rebuild a previously persisted record, preserving its original key.
    pub fn restored(key: String, screen: S, args: BTreeMap<String, serde_json::Value>) -> Self {
        Record { key, screen, args }
    }
}

impl<S: PartialEq> Record<S> {
    /// True if `other` presents the same screen with the same args.
    ///
    /// Keys are ignored: they are always unique, so the duplicate-push guard
    /// compares destinations field by field instead.
    pub fn same_destination(&self, other: &Record<S>) -> bool {
        self.screen == other.screen && self.args == other.args
    }
}
