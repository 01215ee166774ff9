//! The record-key to result-channel registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::channel::ResultChannel;

/// Routes results between records identified by their unique keys.
///
/// Each key owns one [`ResultChannel`]: preparing arms it with a tag,
/// sending buffers a value (overwriting an unconsumed one), and awaiting
/// suspends until a value arrives -- but only when the caller's tag matches
/// the armed expectation, so a stale await returns `None` immediately
/// instead of hanging forever.
///
/// Cloning is shallow: clones share the same registry, which is how the
/// navigation owner and awaiting presenter tasks see consistent state.
#[derive(Debug)]
pub struct ResultHandler<V> {
    channels: Arc<Mutex<HashMap<String, Arc<ResultChannel<V>>>>>,
}

impl<V> Clone for ResultHandler<V> {
    fn clone(&self) -> Self {
        ResultHandler {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl<V> Default for ResultHandler<V> {
    fn default() -> Self {
        ResultHandler::new()
    }
}

impl<V> ResultHandler<V> {
    pub fn new() -> Self {
        ResultHandler {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Held only for map lookups/inserts, never across an await.
    fn channels(&self) -> MutexGuard<'_, HashMap<String, Arc<ResultChannel<V>>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn channel(&self, record_key: &str) -> Option<Arc<ResultChannel<V>>> {
        self.channels().get(record_key).cloned()
    }

    fn channel_or_insert(&self, record_key: &str) -> Arc<ResultChannel<V>> {
        Arc::clone(
            self.channels()
                .entry(record_key.to_string())
                .or_insert_with(|| Arc::new(ResultChannel::new())),
        )
    }

    /// Arm `record_key` to receive a result tagged `result_tag`.
    ///
    /// A fresh expectation invalidates any stale buffered value from a
    /// previous visit to the record, so a later await can never observe a
    /// result that predates this call.
    pub fn prepare_for_result(&self, record_key: &str, result_tag: impl Into<String>) {
        self.channel_or_insert(record_key).prepare(result_tag.into());
    }

    /// True if `record_key` is currently armed with an expectation, or an
    /// awaiter has claimed it and is still suspended waiting for the value.
    pub fn expecting_result(&self, record_key: &str) -> bool {
        self.channel(record_key).is_some_and(|c| c.expecting())
    }

    /// Buffer `value` for `record_key`, creating the channel if absent.
    /// Overwrites an unconsumed prior value (only the most recent result
    /// matters) and wakes a suspended await.
    pub fn send_result(&self, record_key: &str, value: V) {
        self.channel_or_insert(record_key).post(value);
    }

    /// Await the result for `record_key` tagged `result_tag`.
    ///
    /// Returns `None` immediately when no channel exists for the key or
    /// the armed tag differs. Otherwise the expectation is claimed
    /// (single-shot per prepare) and the call suspends until a value is
    /// posted, returning an already-buffered value without suspending.
    /// The key keeps reporting as expecting for as long as the awaiter is
    /// suspended, so a pop that happens mid-await still delivers.
    ///
    /// Abandoning the await (task cancellation) is not an error: any value
    /// posted later remains buffered until a future prepare drains it or a
    /// future await on the same key takes it.
    pub async fn await_result(&self, record_key: &str, result_tag: &str) -> Option<V> {
        let channel = self.channel(record_key)?;
        if !channel.consume_expectation(result_tag) {
            return None;
        }
        Some(channel.receive().await)
    }

    /// Capture the registry for persistence.
    ///
    /// Channels are sorted by record key so the persisted form is
    /// deterministic.
    pub fn save(&self) -> HandlerState<V>
    where
        V: Clone,
    {
        let mut channels: Vec<SavedChannel<V>> = self
            .channels()
            .iter()
            .map(|(key, channel)| {
                let (expected_tag, pending) = channel.saved_parts();
                SavedChannel {
                    key: key.clone(),
                    expected_tag,
                    pending,
                }
            })
            .collect();
        channels.sort_by(|a, b| a.key.cmp(&b.key));
        HandlerState { channels }
    }

    /// Rebuild a registry from its persisted form.
    pub fn restore(state: HandlerState<V>) -> ResultHandler<V> {
        let handler = ResultHandler::new();
        for channel in state.channels {
            // Order matters: preparing drains the buffer, so the pending
            // value is re-posted afterward.
            if let Some(tag) = channel.expected_tag {
                handler.prepare_for_result(&channel.key, tag);
            }
            if let Some(value) = channel.pending {
                handler.send_result(&channel.key, value);
            }
        }
        handler
    }
}

/// Persisted state of one record's channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedChannel<V> {
    pub key: String,
    pub expected_tag: Option<String>,
    pub pending: Option<V>,
}

/// Persisted form of a [`ResultHandler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerState<V> {
    pub channels: Vec<SavedChannel<V>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_await_without_channel_returns_none() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        assert_eq!(handler.await_result("missing", "tag").await, None);
    }

    #[tokio::test]
    async fn test_await_with_wrong_tag_returns_none() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.prepare_for_result("rec", "expected");
        assert_eq!(handler.await_result("rec", "other").await, None);
        // The expectation survives a mismatched await.
        assert!(handler.expecting_result("rec"));
    }

    #[tokio::test]
    async fn test_send_then_await_delivers() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.prepare_for_result("rec", "tag");
        handler.send_result("rec", 42);
        assert_eq!(handler.await_result("rec", "tag").await, Some(42));
        // Expectation consumed; a repeat await is a stale no-op.
        assert_eq!(handler.await_result("rec", "tag").await, None);
    }

    #[tokio::test]
    async fn test_suspended_await_still_reports_expecting() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.prepare_for_result("rec", "tag");
        let waiter = {
            let handler = handler.clone();
            tokio::spawn(async move { handler.await_result("rec", "tag").await })
        };
        tokio::task::yield_now().await;
        // The parked awaiter holds the expectation open for the sender.
        assert!(handler.expecting_result("rec"));
        handler.send_result("rec", 9);
        assert_eq!(waiter.await.unwrap(), Some(9));
        assert!(!handler.expecting_result("rec"));
    }

    #[tokio::test]
    async fn test_prepare_discards_stale_result() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.prepare_for_result("rec", "first");
        handler.send_result("rec", 1);
        // Re-arming for a new visit invalidates the unconsumed value.
        handler.prepare_for_result("rec", "second");
        handler.send_result("rec", 2);
        assert_eq!(handler.await_result("rec", "second").await, Some(2));
    }

    #[tokio::test]
    async fn test_drop_oldest_overflow() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.prepare_for_result("rec", "tag");
        handler.send_result("rec", 1);
        handler.send_result("rec", 2);
        assert_eq!(handler.await_result("rec", "tag").await, Some(2));
    }

    #[tokio::test]
    async fn test_send_without_expectation_is_buffered_not_lost() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.send_result("rec", 5);
        assert!(!handler.expecting_result("rec"));
        // A mismatched await cannot take it.
        assert_eq!(handler.await_result("rec", "tag").await, None);
        // Re-arming drains it; only values posted after the prepare count.
        handler.prepare_for_result("rec", "tag");
        handler.send_result("rec", 6);
        assert_eq!(handler.await_result("rec", "tag").await, Some(6));
    }

    #[tokio::test]
    async fn test_save_restore_preserves_tag_and_pending() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        handler.prepare_for_result("rec", "tag");
        handler.send_result("rec", 42);
        handler.prepare_for_result("idle", "unused");

        let json = serde_json::to_string(&handler.save()).unwrap();
        let state: HandlerState<u32> = serde_json::from_str(&json).unwrap();
        let restored = ResultHandler::restore(state);

        assert!(restored.expecting_result("idle"));
        assert_eq!(restored.await_result("rec", "tag").await, Some(42));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handler: ResultHandler<u32> = ResultHandler::new();
        let other = handler.clone();
        handler.prepare_for_result("rec", "tag");
        assert!(other.expecting_result("rec"));
        other.send_result("rec", 3);
        assert_eq!(handler.await_result("rec", "tag").await, Some(3));
    }
}
