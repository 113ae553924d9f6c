//! Property-based tests for handler update laws
//!
//! Validates:
//! - NoOp is the identity on every state
//! - tick() completes for any mix of handlers and never touches a failed state
//! - NoOp-only dispatchers are stable across any number of ticks
//! - Incremental updates bump the version by exactly one or change nothing

use patchcraft_core::{Change, HandlerId, HandlerState, Patch};
use patchcraft_dispatch::{HandlerKind, UpdateDispatcher};
use proptest::prelude::*;

fn arb_patch() -> impl Strategy<Value = Patch> {
    ("[a-z0-9 ]{0,6}", "[a-z ]{0,8}").prop_map(|(id, payload)| Patch::new(id, payload))
}

fn arb_change() -> impl Strategy<Value = Change> {
    ("[a-z0-9]{1,6}", "[a-z ]{0,8}").prop_map(|(id, payload)| Change::new(id, payload))
}

fn arb_state() -> impl Strategy<Value = HandlerState> {
    (
        0u64..1_000,
        prop::collection::vec(arb_patch(), 0..5),
        prop::collection::vec(arb_change(), 0..5),
    )
        .prop_map(|(version, patches, changes)| HandlerState::new(version, patches, changes))
}

fn arb_kind() -> impl Strategy<Value = HandlerKind> {
    prop::sample::select(HandlerKind::ALL.to_vec())
}

fn handler_id(index: usize) -> HandlerId {
    HandlerId::parse(&format!("server:h{index}")).expect("valid handler id")
}

proptest! {
    /// Property: NoOp returns its input unchanged
    #[test]
    fn noop_is_identity(state in arb_state()) {
        prop_assert_eq!(HandlerKind::NoOp.handle_update(&state), Ok(state));
    }

    /// Property: Incremental either bumps the version by one and settles,
    /// or fails and produces nothing
    #[test]
    fn incremental_bumps_once_or_fails(state in arb_state()) {
        match HandlerKind::Incremental.handle_update(&state) {
            Ok(next) => {
                prop_assert_eq!(next.patch_version, state.patch_version + 1);
                prop_assert!(next.is_settled());
            }
            Err(_) => {
                let has_blank_patch = state
                    .pending_patches
                    .iter()
                    .any(|p| p.id().trim().is_empty() || p.payload().trim().is_empty());
                prop_assert!(has_blank_patch);
            }
        }
    }

    /// Property: tick() always completes; failed handlers keep their state
    /// and successful ones hold exactly what the handler returned
    #[test]
    fn tick_is_total_and_isolates_failures(
        handlers in prop::collection::vec((arb_kind(), arb_state()), 0..8),
    ) {
        let mut dispatcher = UpdateDispatcher::new();
        for (index, (kind, state)) in handlers.iter().enumerate() {
            dispatcher
                .register_with_state(handler_id(index), *kind, state.clone())
                .expect("unique ids");
        }

        let report = dispatcher.tick();
        prop_assert_eq!(report.outcomes.len(), handlers.len());

        for (index, (kind, before)) in handlers.iter().enumerate() {
            let id = handler_id(index);
            let after = dispatcher.state(&id).expect("registered");
            match kind.handle_update(before) {
                Ok(expected) => {
                    prop_assert_eq!(after, &expected);
                    prop_assert!(dispatcher.last_error(&id).expect("registered").is_none());
                }
                Err(expected) => {
                    prop_assert_eq!(after, before);
                    prop_assert_eq!(
                        dispatcher.last_error(&id).expect("registered"),
                        Some(&expected)
                    );
                }
            }
        }
    }

    /// Property: NoOp-only dispatchers never change across ticks
    #[test]
    fn noop_dispatcher_is_stable(
        states in prop::collection::vec(arb_state(), 1..6),
        ticks in 1usize..10,
    ) {
        let mut dispatcher = UpdateDispatcher::new();
        for (index, state) in states.iter().enumerate() {
            dispatcher
                .register_with_state(handler_id(index), HandlerKind::NoOp, state.clone())
                .expect("unique ids");
        }

        for _ in 0..ticks {
            prop_assert!(dispatcher.tick().is_clean());
        }

        for (index, state) in states.iter().enumerate() {
            prop_assert_eq!(dispatcher.state(&handler_id(index)).expect("registered"), state);
        }
    }
}
