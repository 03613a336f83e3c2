//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::query::Answer;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::Chat), Just(Variant::Form)]
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(Message::query),
        "[a-z ]{1,20}".prop_map(Message::response),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec(("[a-z]{1,10}", "[a-z]{1,10}"), 0..5).prop_map(|pairs| {
        pairs
            .into_iter()
            .flat_map(|(q, a)| [Message::query(q), Message::response(a)])
            .collect()
    })
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Mount),
        arb_history().prop_map(|messages| Event::HistoryLoaded { messages }),
        "[a-z ]{0,10}".prop_map(|text| Event::InputChanged { text }),
        "[a-z ]{0,10}".prop_map(|text| Event::Submit { text }),
        arb_blank().prop_map(|text| Event::Submit { text }),
        Just(Event::Reset),
        "[a-z]{1,10}".prop_map(|s| Event::QueryAnswered {
            answer: Answer::text(s)
        }),
        "[a-z ]{1,10}".prop_map(|reason| Event::QueryFailed { reason }),
    ]
}

fn arb_loading_state() -> impl Strategy<Value = ConvState> {
    (arb_history(), "[a-z]{1,10}").prop_map(|(mut messages, query)| {
        messages.push(Message::query(query.clone()));
        ConvState {
            messages,
            status: RequestStatus::Loading { query },
            ..ConvState::default()
        }
    })
}

// ============================================================================
// Validity Checkers
// ============================================================================

/// Every response has an earlier unmatched query
fn responses_follow_queries(messages: &[Message]) -> bool {
    let mut open_queries = 0usize;
    for message in messages {
        match message.kind {
            MessageKind::Query => open_queries += 1,
            MessageKind::Response => {
                if open_queries == 0 {
                    return false;
                }
                open_queries -= 1;
            }
        }
    }
    true
}

fn request_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::RequestAnswer { .. }))
        .count()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: no response without a prior query
    #[test]
    fn prop_responses_follow_queries(
        variant in arb_variant(),
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let ctx = ConvContext::new(variant);
        let mut state = ConvState::default();

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                state = result.new_state;
                prop_assert!(
                    responses_follow_queries(&state.messages),
                    "Orphan response in {:?}",
                    state.messages
                );
            }
        }
    }

    // Invariant 2: the log only grows, and the old log stays a prefix
    // (seeding from history prepends, so compare suffixes there)
    #[test]
    fn prop_messages_never_shrink(
        variant in arb_variant(),
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let ctx = ConvContext::new(variant);
        let mut state = ConvState::default();

        for event in events {
            let seeding = matches!(event, Event::HistoryLoaded { .. });
            if let Ok(result) = transition(&state, &ctx, event) {
                let old = &state.messages;
                let new = &result.new_state.messages;
                prop_assert!(new.len() >= old.len());
                if seeding {
                    prop_assert!(new.ends_with(old));
                } else {
                    prop_assert!(new.starts_with(old));
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 3: blank input never creates a message or a request
    #[test]
    fn prop_blank_submit_is_noop(state in arb_loading_state(), text in arb_blank()) {
        for base in [state.clone(), ConvState::default()] {
            let result = transition(&base, &ConvContext::new(Variant::Chat), Event::Submit { text: text.clone() });
            let result = result.expect("blank submit never errors");
            prop_assert_eq!(&result.new_state, &base);
            prop_assert!(result.effects.is_empty());
        }
    }

    // Invariant 4: at most one request in flight
    #[test]
    fn prop_loading_rejects_submit(state in arb_loading_state(), text in "[a-z]{1,10}") {
        let result = transition(&state, &ConvContext::new(Variant::Chat), Event::Submit { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::RequestInFlight);
    }

    // Invariant 5: a request is only issued when entering Loading
    #[test]
    fn prop_requests_only_when_loading(
        variant in arb_variant(),
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let ctx = ConvContext::new(variant);
        let mut state = ConvState::default();

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                let requests = request_count(&result.effects);
                prop_assert!(requests <= 1);
                if requests == 1 {
                    prop_assert!(!state.status.is_loading());
                    prop_assert!(result.new_state.status.is_loading());
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 6: the error state is always recoverable by a new submit
    #[test]
    fn prop_error_always_recoverable(history in arb_history(), text in "[a-z]{1,10}") {
        let state = ConvState {
            messages: history,
            status: RequestStatus::Error { message: REQUEST_FAILED_MESSAGE.to_string() },
            ..ConvState::default()
        };
        let result = transition(&state, &ConvContext::new(Variant::Chat), Event::Submit { text });
        prop_assert!(result.is_ok());
        prop_assert!(result.unwrap().new_state.status.is_loading());
    }

    // Invariant 7: persistence only happens on success, and carries the pair
    #[test]
    fn prop_persist_only_on_success(state in arb_loading_state(), answer in "[a-z]{1,10}") {
        let RequestStatus::Loading { query } = state.status.clone() else {
            unreachable!("generator always yields loading states");
        };
        let ctx = ConvContext::new(Variant::Chat);

        let ok = transition(&state, &ctx, Event::QueryAnswered { answer: Answer::text(answer.clone()) }).unwrap();
        let persisted: Vec<_> = ok.effects.iter().filter_map(|e| match e {
            Effect::PersistExchange { messages } => Some(messages.clone()),
            _ => None,
        }).collect();
        prop_assert_eq!(persisted, vec![vec![Message::query(query), Message::response(answer)]]);

        let failed = transition(&state, &ctx, Event::QueryFailed { reason: "x".to_string() }).unwrap();
        let failed_persists = failed.effects.iter().any(|e| matches!(e, Effect::PersistExchange { .. }));
        prop_assert!(!failed_persists);
    }
}
