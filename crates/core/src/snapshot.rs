//! Immutable point-in-time captures of a navigation stack.

use crate::record::Record;

/// An immutable capture of a [`NavStack`](crate::NavStack)'s entries and
/// current position.
///
/// Snapshots are what read consumers (renderers, transition decorators)
/// iterate instead of the live stack, so they never observe a mutation
/// mid-read. They are also the stored value for saved sub-stacks.
///
/// Entries are ordered top-first: index 0 is the newest record, the last
/// index is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    entries: Vec<Record<S>>,
    current_index: usize,
}

impl<S> Snapshot<S> {
    /// Invariant: `current_index < entries.len()` whenever `entries` is
    /// non-empty. Upheld by the capturing `NavStack` and by persistence
    /// validation.
    pub(crate) fn new(entries: Vec<Record<S>>, current_index: usize) -> Self {
        Snapshot {
            entries,
            current_index,
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Record<S>>, usize) {
        (self.entries, self.current_index)
    }

    /// Number of captured records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of the current record within [`iter`](Snapshot::iter) order.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The newest captured record, or `None` if empty.
    pub fn top(&self) -> Option<&Record<S>> {
        self.entries.first()
    }

    /// The record that was active at capture time, or `None` if empty.
    pub fn current(&self) -> Option<&Record<S>> {
        self.entries.get(self.current_index)
    }

    /// The oldest captured record, or `None` if empty.
    pub fn root(&self) -> Option<&Record<S>> {
        self.entries.last()
    }

    /// All records from top (newest) to root (oldest).
    pub fn iter(&self) -> impl Iterator<Item = &Record<S>> {
        self.entries.iter()
    }

    /// Records from the current position toward the top, inclusive of both.
    pub fn forward(&self) -> impl Iterator<Item = &Record<S>> {
        let end = if self.entries.is_empty() {
            0
        } else {
            self.current_index + 1
        };
        self.entries[..end].iter().rev()
    }

    /// Records from the current position toward the root, inclusive of both.
    pub fn backward(&self) -> impl Iterator<Item = &Record<S>> {
        let start = self.current_index.min(self.entries.len());
        self.entries[start..].iter()
    }
}
