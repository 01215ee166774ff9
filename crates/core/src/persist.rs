//! Persisted representation of a navigation stack.
//!
//! The layout is nested primitives only (ints, strings, lists, maps), so
//! any "save this named value across teardown/recreation" substrate can
//! carry it: `[current_index, entries, saved sub-stacks]`, where each
//! record serializes as `{key, screen, args}`. Saved sub-stacks carry no
//! explicit key; they are re-keyed on restore by the screen of their last
//! (root) entry, exactly as the live store keys them.

use serde::{Deserialize, Serialize};

use crate::error::RestoreError;
use crate::record::{Record, Screen};
use crate::snapshot::Snapshot;
use crate::stack::NavStack;

/// One persisted sub-stack: its records (top-first) and current position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSnapshot<S> {
    pub entries: Vec<Record<S>>,
    pub current_index: usize,
}

/// The full persisted form of a [`NavStack`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStack<S> {
    pub current_index: usize,
    pub entries: Vec<Record<S>>,
    #[serde(default = "Vec::new")]
    pub saved: Vec<SavedSnapshot<S>>,
}

impl<S: Screen> NavStack<S> {
    /// Capture this stack's complete state for persistence.
    pub fn save(&self) -> SavedStack<S>
    where
        S: Serialize,
    {
        let (entries, current_index, state_store) = self.parts();
        SavedStack {
            current_index,
            entries: entries.to_vec(),
            saved: state_store
                .iter()
                .map(|(_, snapshot)| SavedSnapshot {
                    entries: snapshot.iter().cloned().collect(),
                    current_index: snapshot.current_index(),
                })
                .collect(),
        }
    }

    /// Rebuild a stack from its persisted form.
    ///
    /// Validates the pointer/entry invariants before constructing: the live
    /// current index must be in range when entries exist, and every saved
    /// sub-stack must be non-empty with an in-range index.
    pub fn restore(saved: SavedStack<S>) -> Result<NavStack<S>, RestoreError> {
        if !saved.entries.is_empty() && saved.current_index >= saved.entries.len() {
            return Err(RestoreError::IndexOutOfRange {
                index: saved.current_index,
                len: saved.entries.len(),
            });
        }
        let current_index = if saved.entries.is_empty() {
            0
        } else {
            saved.current_index
        };

        let mut state_store = Vec::with_capacity(saved.saved.len());
        for sub in saved.saved {
            let Some(root) = sub.entries.last().map(|r| r.screen.clone()) else {
                return Err(RestoreError::EmptySnapshot);
            };
            if sub.current_index >= sub.entries.len() {
                return Err(RestoreError::IndexOutOfRange {
                    index: sub.current_index,
                    len: sub.entries.len(),
                });
            }
            state_store.push((root, Snapshot::new(sub.entries, sub.current_index)));
        }

        Ok(NavStack::from_parts(saved.entries, current_index, state_store))
    }
}
