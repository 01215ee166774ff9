//! The live navigation stack: ordered records plus a current-position
//! pointer.
//!
//! The entry list is ordered top-first: index 0 is the newest record, the
//! last index is the root. The pointer enables browser-style traversal:
//! moving backward does not discard history, so the user can move forward
//! again, while pushing a new destination truncates any forward history
//! (introducing a new branch invalidates the old one).
//!
//! Key invariant: `current_index < entries.len()` whenever the stack is
//! non-empty. When the stack empties, the pointer resets to 0 and carries
//! no meaning.

use crate::record::{Record, Screen};
use crate::snapshot::Snapshot;

// ──────────────────────────────────────────────
// Traversal direction and reset policy
// ──────────────────────────────────────────────

/// Direction of pointer movement through navigation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the top (newest) record.
    Forward,
    /// Toward the root (oldest) record.
    Backward,
}

/// State management policy for [`NavStack::reset_root`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateOptions {
    /// Save the outgoing stack before clearing it. It can later be restored
    /// by resetting back to its root screen with `restore` set.
    pub save: bool,
    /// Restore previously saved state for the new root, if any. When false
    /// or absent, the stack will contain only the fresh root record.
    pub restore: bool,
    /// Drop any still-saved state for the new root after the restore
    /// attempt, whether or not `restore` was set.
    pub clear: bool,
}

impl StateOptions {
    /// Single-stack pattern: saves nothing, restores nothing.
    pub const DEFAULT: StateOptions = StateOptions {
        save: false,
        restore: false,
        clear: false,
    };

    /// Multiple-stacks pattern (e.g. bottom-bar tabs): save the outgoing
    /// stack and restore the incoming one when possible.
    pub const SAVE_AND_RESTORE: StateOptions = StateOptions {
        save: true,
        restore: true,
        clear: false,
    };
}

impl Default for StateOptions {
    fn default() -> Self {
        StateOptions::DEFAULT
    }
}

// ──────────────────────────────────────────────
// NavStack
// ──────────────────────────────────────────────

/// A navigation stack with bidirectional history and saved sub-stacks.
///
/// Structural mutation is single-owner: all mutating operations take
/// `&mut self` and edge conditions surface as `bool`/`Option` returns,
/// never panics (the one exception is seeding with zero screens, which is
/// a programmer error).
///
/// Saved sub-stacks are keyed by their root screen via
/// [`save_state`](NavStack::save_state) /
/// [`restore_state`](NavStack::restore_state), enabling independent
/// per-root histories.
#[derive(Debug, Clone)]
pub struct NavStack<S> {
    /// Top-first: `entries[0]` is the newest record, `entries[len - 1]`
    /// the root.
    entries: Vec<Record<S>>,
    /// Pointer into `entries`; meaningful only when non-empty.
    current_index: usize,
    /// Saved sub-stacks keyed by root screen, insertion-ordered.
    state_store: Vec<(S, Snapshot<S>)>,
    /// Bumped on every successful mutation. Read consumers compare
    /// versions to decide when to take a fresh [`Snapshot`].
    version: u64,
}

impl<S: Screen> Default for NavStack<S> {
    fn default() -> Self {
        NavStack::new()
    }
}

impl<S: Screen> NavStack<S> {
    /// Create an empty stack.
    pub fn new() -> Self {
        NavStack {
            entries: Vec::new(),
            current_index: 0,
            state_store: Vec::new(),
            version: 0,
        }
    }

    /// Create a stack seeded with a single root screen.
    pub fn with_root(root: S) -> Self {
        let mut stack = NavStack::new();
        stack.push(Record::new(root));
        stack
    }

    /// Create a stack seeded with `screens`, pushed in order (the last
    /// screen ends up on top).
    ///
    /// # Panics
    ///
    /// Panics if `screens` is empty: a seeded stack must always have a
    /// current record, and no later operation can recover from violating
    /// that.
    pub fn with_screens(screens: Vec<S>) -> Self {
        assert!(!screens.is_empty(), "initial screens cannot be empty");
        let mut stack = NavStack::new();
        for screen in screens {
            stack.push(Record::new(screen));
        }
        stack
    }

    // ── Read accessors ────────────────────────────────────────────────

    /// Number of records in the stack, including forward history.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest record, or `None` if empty.
    pub fn top_record(&self) -> Option<&Record<S>> {
        self.entries.first()
    }

    /// The active record, or `None` if empty. Differs from
    /// [`top_record`](NavStack::top_record) after moving backward.
    pub fn current_record(&self) -> Option<&Record<S>> {
        self.entries.get(self.current_index)
    }

    /// The oldest record, or `None` if empty.
    pub fn root_record(&self) -> Option<&Record<S>> {
        self.entries.last()
    }

    /// The screen of the active record, or `None` if empty.
    pub fn current_screen(&self) -> Option<&S> {
        self.current_record().map(|r| &r.screen)
    }

    /// True if the current position is at the root (also true when empty).
    pub fn is_at_root(&self) -> bool {
        self.entries.is_empty() || self.current_index + 1 == self.entries.len()
    }

    /// True if the current position is at the top (also true when empty).
    pub fn is_at_top(&self) -> bool {
        self.current_index == 0
    }

    /// True if backward movement is possible (not empty, not at root).
    pub fn can_go_back(&self) -> bool {
        !self.is_at_root()
    }

    /// True if forward movement is possible (not at top).
    pub fn can_go_forward(&self) -> bool {
        self.current_index > 0
    }

    /// Number of forward-history entries (between current and top,
    /// exclusive of current).
    pub fn forward_len(&self) -> usize {
        self.current_index
    }

    /// All records from top (newest) to root (oldest), including forward
    /// history.
    pub fn records(&self) -> impl Iterator<Item = &Record<S>> {
        self.entries.iter()
    }

    /// Monotonic mutation counter. Unchanged reads are guaranteed between
    /// equal versions.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Immutable capture of the live entries and position, or `None` if
    /// empty.
    pub fn snapshot(&self) -> Option<Snapshot<S>> {
        if self.entries.is_empty() {
            None
        } else {
            Some(Snapshot::new(self.entries.clone(), self.current_index))
        }
    }

    // ── Structural mutation ───────────────────────────────────────────

    /// Push a record, truncating forward history.
    ///
    /// Rejected (returns false, no mutation) when the record presents the
    /// same screen with the same args as the current record: after
    /// truncation the two would sit adjacent, and consecutive duplicates
    /// are never allowed. Keys are ignored by the guard since they are
    /// always unique. Pushing to an empty stack always succeeds.
    pub fn push(&mut self, record: Record<S>) -> bool {
        if let Some(current) = self.current_record() {
            if current.same_destination(&record) {
                return false;
            }
        }
        // Entries ahead of the current position are stale forward history;
        // a new branch invalidates them.
        self.entries.drain(..self.current_index);
        self.entries.insert(0, record);
        self.current_index = 0;
        self.version += 1;
        true
    }

    /// Push a fresh record for `screen` with no args.
    pub fn push_screen(&mut self, screen: S) -> bool {
        self.push(Record::new(screen))
    }

    /// Push a fresh record for `screen` with the given args.
    pub fn push_screen_with_args(
        &mut self,
        screen: S,
        args: std::collections::BTreeMap<String, serde_json::Value>,
    ) -> bool {
        self.push(Record::with_args(screen, args))
    }

    /// Remove and return the current record, truncating forward history
    /// first.
    ///
    /// Entries at indices `[0, current_index)` are discarded, then the
    /// record now at position 0 (the old current record) is removed and
    /// returned. The record beneath it becomes both top and current.
    /// Returns `None` if the stack is empty; removing the last remaining
    /// record returns it and leaves the stack empty.
    pub fn pop(&mut self) -> Option<Record<S>> {
        if self.entries.is_empty() {
            return None;
        }
        self.entries.drain(..self.current_index);
        self.current_index = 0;
        let popped = self.entries.remove(0);
        self.version += 1;
        Some(popped)
    }

    /// Pop records until the top record matches `predicate` or the stack
    /// empties. Returns the popped records in pop order.
    pub fn pop_until(&mut self, mut predicate: impl FnMut(&Record<S>) -> bool) -> Vec<Record<S>> {
        let mut popped = Vec::new();
        while let Some(top) = self.top_record() {
            if predicate(top) {
                break;
            }
            match self.pop() {
                Some(record) => popped.push(record),
                None => break,
            }
        }
        popped
    }

    /// Move the current position one step in `direction`.
    ///
    /// Forward moves toward the top (newest), backward toward the root
    /// (oldest). Returns false at either boundary without mutating.
    pub fn step(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Forward if self.current_index > 0 => {
                self.current_index -= 1;
                self.version += 1;
                true
            }
            Direction::Backward
                if !self.entries.is_empty() && self.current_index + 1 < self.entries.len() =>
            {
                self.current_index += 1;
                self.version += 1;
                true
            }
            _ => false,
        }
    }

    /// Move toward the top record. Equivalent to
    /// `step(Direction::Forward)`.
    pub fn forward(&mut self) -> bool {
        self.step(Direction::Forward)
    }

    /// Move toward the root record. Equivalent to
    /// `step(Direction::Backward)`.
    pub fn backward(&mut self) -> bool {
        self.step(Direction::Backward)
    }

    /// Clear the stack and navigate to a new root.
    ///
    /// Per `options`: optionally saves the outgoing stack first, then
    /// drains all live entries, then either restores previously saved
    /// state for `screen` or pushes a fresh root record, then optionally
    /// clears any remaining saved state for `screen`. Returns the drained
    /// records, top-first.
    pub fn reset_root(&mut self, screen: S, options: StateOptions) -> Vec<Record<S>> {
        if options.save {
            self.save_state();
        }
        let drained: Vec<Record<S>> = self.entries.drain(..).collect();
        self.current_index = 0;
        self.version += 1;
        let restored = options.restore && self.restore_state(&screen);
        if options.clear {
            self.remove_state(&screen);
        }
        if !restored {
            self.push(Record::new(screen));
        }
        drained
    }

    // ── Saved sub-stacks ──────────────────────────────────────────────

    /// Save the full entry list and current position, keyed by the root
    /// screen. Overwrites any prior save for that root. No-op when empty.
    pub fn save_state(&mut self) {
        let Some(snapshot) = self.snapshot() else {
            return;
        };
        // root_record is Some here since snapshot() returned Some.
        let Some(root) = self.root_record().map(|r| r.screen.clone()) else {
            return;
        };
        match self.state_store.iter_mut().find(|(s, _)| *s == root) {
            Some(slot) => slot.1 = snapshot,
            None => self.state_store.push((root, snapshot)),
        }
        self.version += 1;
    }

    /// Restore the saved sub-stack for `screen`, if any.
    ///
    /// The restored entries are spliced in as the new top segment and the
    /// current position is taken from the saved snapshot. The saved entry
    /// is consumed. Returns false, with no mutation, when nothing (or an
    /// empty snapshot) is stored for `screen`.
    pub fn restore_state(&mut self, screen: &S) -> bool {
        let Some(pos) = self
            .state_store
            .iter()
            .position(|(s, snap)| s == screen && !snap.is_empty())
        else {
            return false;
        };
        let (_, snapshot) = self.state_store.remove(pos);
        let (restored, index) = snapshot.into_parts();
        self.entries.splice(0..0, restored);
        self.current_index = index;
        self.version += 1;
        true
    }

    /// Root screens that currently have saved state, in save order.
    pub fn peek_state(&self) -> Vec<S> {
        self.state_store.iter().map(|(s, _)| s.clone()).collect()
    }

    /// Drop the saved sub-stack for `screen` without restoring it.
    pub fn remove_state(&mut self, screen: &S) -> bool {
        let Some(pos) = self.state_store.iter().position(|(s, _)| s == screen) else {
            return false;
        };
        self.state_store.remove(pos);
        self.version += 1;
        true
    }

    /// Drop all saved sub-stacks.
    pub fn clear_state(&mut self) {
        for screen in self.peek_state() {
            self.remove_state(&screen);
        }
    }

    // ── Membership queries ────────────────────────────────────────────

    /// True if `record` is in the live stack, or (with `include_saved`) in
    /// any saved sub-stack.
    pub fn contains_record(&self, record: &Record<S>, include_saved: bool) -> bool {
        if self.entries.iter().any(|r| r == record) {
            return true;
        }
        if include_saved {
            for (_, snapshot) in &self.state_store {
                if snapshot.iter().any(|r| r == record) {
                    return true;
                }
            }
        }
        false
    }

    /// True if a record with `key` sits within the first `depth` live
    /// entries (indices `< depth`, counted from the top), or (with
    /// `include_saved`) is the first record of one of the first `depth`
    /// saved sub-stacks.
    ///
    /// Answers "would this record still be findable within N pops" without
    /// mutating anything.
    pub fn is_record_reachable(&self, key: &str, depth: usize, include_saved: bool) -> bool {
        if self.entries.iter().take(depth).any(|r| r.key == key) {
            return true;
        }
        if include_saved {
            for (_, snapshot) in self.state_store.iter().take(depth) {
                if snapshot.top().is_some_and(|r| r.key == key) {
                    return true;
                }
            }
        }
        false
    }

    // ── Internal (persistence) ────────────────────────────────────────

    pub(crate) fn parts(&self) -> (&[Record<S>], usize, &[(S, Snapshot<S>)]) {
        (&self.entries, self.current_index, &self.state_store)
    }

    pub(crate) fn from_parts(
        entries: Vec<Record<S>>,
        current_index: usize,
        state_store: Vec<(S, Snapshot<S>)>,
    ) -> Self {
        NavStack {
            entries,
            current_index,
            state_store,
            version: 0,
        }
    }
}
