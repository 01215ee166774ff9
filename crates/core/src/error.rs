//! Errors for restoring persisted navigation state.

/// Why a persisted [`SavedStack`](crate::SavedStack) could not be turned
/// back into a live stack.
///
/// Ordinary navigation edge cases (rejected push, empty pop, boundary move,
/// missing restore target) are signaled through `bool`/`Option` returns and
/// never reach this type; it only covers structurally invalid persisted
/// data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RestoreError {
    /// A current index pointing outside its entry list.
    #[error("current index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// A saved sub-stack with no entries. Saving never produces one, and an
    /// empty sub-stack has no root screen to key it by.
    #[error("saved snapshot has no entries")]
    EmptySnapshot,
}
