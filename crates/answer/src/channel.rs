//! The per-record result channel: a one-slot, overwrite-oldest buffer
//! gated by an expected tag.
//!
//! A record may be pushed over and popped back to many times, so this is a
//! reusable slot rather than a one-shot future: each post overwrites an
//! unconsumed prior value (only the most recent result matters), and each
//! receive drains the slot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// Channel state guarded by the slot mutex.
#[derive(Debug)]
struct Slot<V> {
    /// At most one buffered value; a new post overwrites it.
    pending: Option<V>,
    /// The tag this channel's record is prepared to receive, if any.
    /// Cleared by a successful await (single-shot expectation).
    expected_tag: Option<String>,
    /// True while a receiver has claimed the expectation but not yet taken
    /// a value. Keeps the channel reporting as expecting so a sender does
    /// not discard the value a parked awaiter is waiting for.
    waiting: bool,
}

/// A single result channel. Shared behind `Arc` by the registry and any
/// task suspended in a receive.
#[derive(Debug)]
pub(crate) struct ResultChannel<V> {
    slot: Mutex<Slot<V>>,
    notify: Notify,
}

impl<V> ResultChannel<V> {
    pub(crate) fn new() -> Self {
        ResultChannel {
            slot: Mutex::new(Slot {
                pending: None,
                expected_tag: None,
                waiting: false,
            }),
            notify: Notify::new(),
        }
    }

    /// The slot mutex is only ever held for field reads/writes, never
    /// across an await, so poisoning cannot leave torn state.
    fn lock(&self) -> MutexGuard<'_, Slot<V>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the channel for `tag`, discarding any stale buffered value from
    /// a previous visit. A parked awaiter from an earlier visit no longer
    /// counts as expecting; the fresh tag supersedes it.
    pub(crate) fn prepare(&self, tag: String) {
        let mut slot = self.lock();
        slot.expected_tag = Some(tag);
        slot.pending = None;
        slot.waiting = false;
    }

    /// True if the channel is armed with a tag, or a receiver has claimed
    /// the expectation and is still waiting for its value.
    pub(crate) fn expecting(&self) -> bool {
        let slot = self.lock();
        slot.expected_tag.is_some() || slot.waiting
    }

    /// Buffer `value`, overwriting an unconsumed prior value, and wake a
    /// suspended receiver if there is one.
    pub(crate) fn post(&self, value: V) {
        self.lock().pending = Some(value);
        self.notify.notify_one();
    }

    /// If the channel is armed with exactly `tag`, consume the expectation
    /// and return true; otherwise leave the channel untouched.
    ///
    /// A consumed expectation keeps the channel in the waiting state until
    /// the receiver takes a value, so `expecting` stays true for the whole
    /// claim-park-deliver window.
    pub(crate) fn consume_expectation(&self, tag: &str) -> bool {
        let mut slot = self.lock();
        if slot.expected_tag.as_deref() == Some(tag) {
            slot.expected_tag = None;
            slot.waiting = true;
            true
        } else {
            false
        }
    }

    /// Wait for a buffered value, returning immediately if one is already
    /// present.
    ///
    /// Cancellation-safe: abandoning the wait takes nothing from the slot,
    /// and a value posted afterward stays buffered for the next receive or
    /// the next `prepare` drain (which also retires the abandoned claim).
    pub(crate) async fn receive(&self) -> V {
        loop {
            // Register interest before checking the slot so a post between
            // the check and the await still wakes us (notify_one stores a
            // permit when no waiter is registered).
            let notified = self.notify.notified();
            {
                let mut slot = self.lock();
                if let Some(value) = slot.pending.take() {
                    slot.waiting = false;
                    return value;
                }
            }
            notified.await;
        }
    }

    /// Non-destructive read of the channel state, for persistence.
    pub(crate) fn saved_parts(&self) -> (Option<String>, Option<V>)
    where
        V: Clone,
    {
        let slot = self.lock();
        (slot.expected_tag.clone(), slot.pending.clone())
    }
}
