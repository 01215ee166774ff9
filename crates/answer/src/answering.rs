//! A navigation stack decorator that routes pop-carried values to the
//! record left on top.

use std::collections::BTreeMap;

use switchback_core::{Direction, NavStack, Record, Screen, Snapshot, StateOptions};

use crate::handler::ResultHandler;

/// Wraps a [`NavStack`] so that popping with a value can answer the record
/// that asked for one.
///
/// The protocol: a record pushes the next screen with a result tag, which
/// primes that record (about to become second-from-top) to receive a
/// result. When the screen on top is eventually popped with a value, the
/// value is delivered to the new top record -- but only if it is still
/// expecting a result; otherwise the value is silently discarded.
///
/// Both intercepted operations run under `&mut self`, so the structural
/// mutation and the routing decision are always observed together: a
/// reader can never see a post-pop stack whose result has not yet been
/// routed. The expectation primed by a push is likewise registered before
/// the push reports success.
#[derive(Debug)]
pub struct AnsweringNavStack<S, V> {
    stack: NavStack<S>,
    handler: ResultHandler<V>,
}

impl<S: Screen, V> AnsweringNavStack<S, V> {
    /// Wrap `stack` with a fresh result handler.
    pub fn new(stack: NavStack<S>) -> Self {
        AnsweringNavStack {
            stack,
            handler: ResultHandler::new(),
        }
    }

    /// Wrap `stack` with an existing handler (e.g. one restored from
    /// persisted state).
    pub fn with_handler(stack: NavStack<S>, handler: ResultHandler<V>) -> Self {
        AnsweringNavStack { stack, handler }
    }

    /// Read access to the wrapped stack.
    pub fn stack(&self) -> &NavStack<S> {
        &self.stack
    }

    /// The shared result handler. Hand a clone to whatever awaits results;
    /// clones observe the same registry.
    pub fn handler(&self) -> &ResultHandler<V> {
        &self.handler
    }

    // ── Intercepted operations ────────────────────────────────────────

    /// Push a record, optionally priming the current record to receive a
    /// result tagged `result_tag` when the pushed record is later popped
    /// with a value.
    pub fn push(&mut self, record: Record<S>, result_tag: Option<&str>) -> bool {
        // Capture the receiver before the structural change: it is the
        // record that will sit beneath the pushed one.
        let receiver_key = self.stack.current_record().map(|r| r.key.clone());
        let pushed = self.stack.push(record);
        if pushed {
            if let (Some(key), Some(tag)) = (receiver_key, result_tag) {
                self.handler.prepare_for_result(&key, tag);
            }
        }
        pushed
    }

    /// Push a fresh record for `screen`. See
    /// [`push`](AnsweringNavStack::push).
    pub fn push_screen(&mut self, screen: S, result_tag: Option<&str>) -> bool {
        self.push(Record::new(screen), result_tag)
    }

    /// Push a fresh record for `screen` with args. See
    /// [`push`](AnsweringNavStack::push).
    pub fn push_screen_with_args(
        &mut self,
        screen: S,
        args: BTreeMap<String, serde_json::Value>,
        result_tag: Option<&str>,
    ) -> bool {
        self.push(Record::with_args(screen, args), result_tag)
    }

    /// Pop the current record, optionally carrying `value` back.
    ///
    /// The structural pop completes first; then, if a value was carried
    /// and the new top record is expecting a result, the value is
    /// delivered to it. A value popped onto a record that expects nothing
    /// is dropped without error.
    pub fn pop(&mut self, value: Option<V>) -> Option<Record<S>> {
        let popped = self.stack.pop();
        if let Some(value) = value {
            if let Some(top) = self.stack.top_record() {
                if self.handler.expecting_result(&top.key) {
                    self.handler.send_result(&top.key, value);
                }
            }
        }
        popped
    }

    // ── Result queries ────────────────────────────────────────────────

    /// True if the record with `record_key` is expecting a result.
    pub fn expecting_result(&self, record_key: &str) -> bool {
        self.handler.expecting_result(record_key)
    }

    /// Await the result for `record_key` tagged `result_tag`. See
    /// [`ResultHandler::await_result`].
    pub async fn await_result(&self, record_key: &str, result_tag: &str) -> Option<V> {
        self.handler.await_result(record_key, result_tag).await
    }

    // ── Forwarded stack operations ────────────────────────────────────

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top_record(&self) -> Option<&Record<S>> {
        self.stack.top_record()
    }

    pub fn current_record(&self) -> Option<&Record<S>> {
        self.stack.current_record()
    }

    pub fn root_record(&self) -> Option<&Record<S>> {
        self.stack.root_record()
    }

    pub fn is_at_root(&self) -> bool {
        self.stack.is_at_root()
    }

    pub fn is_at_top(&self) -> bool {
        self.stack.is_at_top()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.stack.can_go_forward()
    }

    pub fn snapshot(&self) -> Option<Snapshot<S>> {
        self.stack.snapshot()
    }

    /// Move the current position without structural change; never routes
    /// results (nothing is removed).
    pub fn step(&mut self, direction: Direction) -> bool {
        self.stack.step(direction)
    }

    pub fn forward(&mut self) -> bool {
        self.stack.forward()
    }

    pub fn backward(&mut self) -> bool {
        self.stack.backward()
    }

    /// Pop records until the top matches `predicate`. No values are
    /// carried, so no results are routed.
    pub fn pop_until(&mut self, predicate: impl FnMut(&Record<S>) -> bool) -> Vec<Record<S>> {
        self.stack.pop_until(predicate)
    }

    /// Clear the stack and navigate to a new root. Handler state is left
    /// untouched: pending expectations survive until re-prepared or
    /// consumed.
    pub fn reset_root(&mut self, screen: S, options: StateOptions) -> Vec<Record<S>> {
        self.stack.reset_root(screen, options)
    }

    pub fn save_state(&mut self) {
        self.stack.save_state();
    }

    pub fn restore_state(&mut self, screen: &S) -> bool {
        self.stack.restore_state(screen)
    }

    pub fn peek_state(&self) -> Vec<S> {
        self.stack.peek_state()
    }

    pub fn remove_state(&mut self, screen: &S) -> bool {
        self.stack.remove_state(screen)
    }
}
