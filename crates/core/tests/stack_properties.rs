//! Executable pin-down of the navigation stack's observable contract:
//! pointer invariants, duplicate-guard idempotence, the forward-history
//! truncation law, pop semantics, reachability, and persistence round
//! trips.

use serde::{Deserialize, Serialize};
use switchback_core::{Direction, NavStack, Record, RestoreError, SavedStack, StateOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum TestScreen {
    Root,
    A,
    B,
    C,
    D,
}

use TestScreen::*;

fn screens(stack: &NavStack<TestScreen>) -> Vec<TestScreen> {
    stack.records().map(|r| r.screen).collect()
}

#[test]
fn pointer_invariant_holds_for_all_op_sequences() {
    // Exhaustively run every 5-step sequence drawn from the structural ops
    // and check the pointer invariant after each step.
    let ops: [fn(&mut NavStack<TestScreen>); 6] = [
        |s| {
            s.push_screen(A);
        },
        |s| {
            s.push_screen(B);
        },
        |s| {
            s.pop();
        },
        |s| {
            s.step(Direction::Forward);
        },
        |s| {
            s.step(Direction::Backward);
        },
        |s| {
            s.push_screen(C);
        },
    ];
    let n = ops.len();
    for seq in 0..n.pow(5) {
        let mut stack = NavStack::with_root(Root);
        let mut code = seq;
        for _ in 0..5 {
            ops[code % n](&mut stack);
            code /= n;
            if stack.is_empty() {
                assert!(stack.current_record().is_none());
            } else {
                assert!(
                    stack.current_record().is_some(),
                    "pointer escaped range in sequence {seq}"
                );
            }
        }
    }
}

#[test]
fn consecutive_duplicate_push_is_rejected() {
    let mut stack = NavStack::with_root(Root);
    assert!(stack.push_screen(A));
    let len = stack.len();
    assert!(!stack.push_screen(A));
    assert_eq!(stack.len(), len);
}

#[test]
fn push_to_empty_stack_always_succeeds() {
    let mut stack: NavStack<TestScreen> = NavStack::new();
    assert!(stack.push_screen(A));
    assert_eq!(stack.len(), 1);
}

#[test]
fn truncation_law() {
    // push(A); push(B); push(C); back; back; push(D) == [D, A, root].
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    stack.push_screen(B);
    stack.push_screen(C);
    assert!(stack.step(Direction::Backward));
    assert!(stack.step(Direction::Backward));
    assert!(stack.push_screen(D));
    assert_eq!(screens(&stack), vec![D, A, Root]);
    assert!(!stack.can_go_forward());
}

#[test]
fn pop_scenario_is_pinned() {
    // Root, then A, B, C: size 4, top C. pop() removes and returns the
    // current record C; the resulting current record is B.
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    stack.push_screen(B);
    stack.push_screen(C);
    assert_eq!(stack.len(), 4);
    assert_eq!(stack.top_record().map(|r| r.screen), Some(C));

    let popped = stack.pop();
    assert_eq!(popped.map(|r| r.screen), Some(C));
    assert_eq!(stack.current_record().map(|r| r.screen), Some(B));
    assert_eq!(stack.top_record().map(|r| r.screen), Some(B));
    assert_eq!(stack.len(), 3);
}

#[test]
fn pop_after_backward_discards_forward_history() {
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    stack.push_screen(B);
    stack.step(Direction::Backward); // current A, forward history holds B
    let popped = stack.pop();
    assert_eq!(popped.map(|r| r.screen), Some(A));
    assert_eq!(screens(&stack), vec![Root]);
}

#[test]
fn derived_queries_track_position() {
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    assert!(stack.is_at_top());
    assert!(!stack.is_at_root());
    assert!(stack.can_go_back());
    assert!(!stack.can_go_forward());

    stack.step(Direction::Backward);
    assert!(stack.is_at_root());
    assert!(stack.can_go_forward());
    assert!(!stack.can_go_back());
}

#[test]
fn saved_state_round_trip_reproduces_entries_and_position() {
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    stack.push_screen(B);
    stack.step(Direction::Backward);
    let before: Vec<String> = stack.records().map(|r| r.key.clone()).collect();
    let current_before = stack.current_record().map(|r| r.key.clone());

    stack.save_state();
    while stack.pop().is_some() {}
    assert!(stack.is_empty());

    assert!(stack.restore_state(&Root));
    let after: Vec<String> = stack.records().map(|r| r.key.clone()).collect();
    assert_eq!(after, before);
    assert_eq!(stack.current_record().map(|r| r.key.clone()), current_before);
}

#[test]
fn reachability_respects_depth_bound() {
    let mut stack = NavStack::with_root(Root);
    let a = Record::new(A);
    let a_key = a.key.clone();
    stack.push(a);
    stack.push_screen(B);
    stack.push_screen(C);
    // [C, B, A, Root]: A is at index 2, outside [0, 2).
    assert!(!stack.is_record_reachable(&a_key, 2, false));
    assert!(stack.is_record_reachable(&a_key, 3, false));
}

#[test]
fn snapshot_is_isolated_from_later_mutation() {
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    let snapshot = stack.snapshot().unwrap();
    stack.push_screen(B);
    stack.pop();
    stack.pop();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.top().map(|r| r.screen), Some(A));
    assert_eq!(snapshot.root().map(|r| r.screen), Some(Root));
}

#[test]
fn persisted_layout_survives_json() {
    let mut stack = NavStack::with_root(Root);
    stack.push_screen(A);
    stack.reset_root(B, StateOptions::SAVE_AND_RESTORE);

    let json = serde_json::to_value(stack.save()).unwrap();
    let saved: SavedStack<TestScreen> = serde_json::from_value(json).unwrap();
    let mut restored = NavStack::restore(saved).unwrap();

    assert_eq!(screens(&restored), vec![B]);
    assert_eq!(restored.peek_state(), vec![Root]);
    assert!(restored.restore_state(&Root));
    assert_eq!(screens(&restored), vec![A, Root, B]);
}

#[test]
fn corrupt_persisted_state_is_rejected() {
    let stack = NavStack::with_root(Root);
    let mut saved = stack.save();
    saved.current_index = 7;
    let err = NavStack::restore(saved).unwrap_err();
    assert_eq!(err, RestoreError::IndexOutOfRange { index: 7, len: 1 });
}
