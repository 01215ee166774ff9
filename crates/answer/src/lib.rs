//! switchback-answer: result delivery between navigation records.
//!
//! Lets a record receive a value produced by a record that was pushed on
//! top of it: push with a result tag to prime the record beneath, pop with
//! a value to deliver it, and `await_result` to suspend until the value
//! arrives.
//!
//! # Public API
//!
//! - [`AnsweringNavStack`] -- a [`NavStack`](switchback_core::NavStack)
//!   decorator that routes pop-carried values
//! - [`ResultHandler`] -- the per-record-key channel registry
//! - [`HandlerState`] / [`SavedChannel`] -- persisted representation

mod answering;
mod channel;
mod handler;

pub use answering::AnsweringNavStack;
pub use handler::{HandlerState, ResultHandler, SavedChannel};
