//! Pure state transition function
//!
//! Given the same state, context and event this always produces the same
//! result; all I/O is described by the returned effects.
//!
//! A submit is a two-phase commit on the message log: `Submit` appends the
//! query unconditionally, `QueryAnswered` appends the response only when the
//! service succeeded.

use super::state::{Message, RequestStatus, REQUEST_FAILED_MESSAGE};
use super::{ConvContext, ConvState, Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    /// No state change and nothing to do
    pub fn unchanged(state: &ConvState) -> Self {
        Self::new(state.clone())
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A request is already in flight")]
    RequestInFlight,
    #[error("Reset is not available in this view")]
    ResetUnavailable,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match event {
        // ============================================================
        // Lifecycle
        // ============================================================
        Event::Mount => Ok(TransitionResult::unchanged(state).with_effect(Effect::LoadHistory)),

        Event::HistoryLoaded { messages } => {
            if messages.is_empty() {
                return Ok(TransitionResult::unchanged(state));
            }
            // Persisted turns predate anything submitted this session
            let mut new_state = state.clone();
            new_state.messages = messages;
            new_state.messages.extend(state.messages.iter().cloned());
            Ok(TransitionResult::new(new_state)
                .with_effects([Effect::PublishState, Effect::ScrollToLatest]))
        }

        // ============================================================
        // User events
        // ============================================================
        Event::InputChanged { text } => {
            let mut new_state = state.clone();
            new_state.pending_input = text;
            Ok(TransitionResult::new(new_state).with_effect(Effect::PublishState))
        }

        Event::Submit { text } => {
            if text.trim().is_empty() {
                return Ok(TransitionResult::unchanged(state));
            }
            if state.status.is_loading() {
                return Err(TransitionError::RequestInFlight);
            }

            // Phase 1: optimistic append
            let mut new_state = state.clone();
            new_state.messages.push(Message::query(text.clone()));
            new_state.pending_input.clear();
            new_state.status = RequestStatus::Loading {
                query: text.clone(),
            };

            Ok(TransitionResult::new(new_state).with_effects([
                Effect::PublishState,
                Effect::request_answer(text),
                Effect::ScrollToLatest,
            ]))
        }

        Event::Reset => {
            if !context.variant.supports_reset() {
                return Err(TransitionError::ResetUnavailable);
            }
            if state.status.is_loading() {
                return Err(TransitionError::RequestInFlight);
            }

            let mut new_state = state.clone();
            new_state.pending_input.clear();
            new_state.response = None;
            new_state.status = RequestStatus::Idle;
            Ok(TransitionResult::new(new_state).with_effect(Effect::PublishState))
        }

        // ============================================================
        // Query service results
        // ============================================================
        Event::QueryAnswered { answer } => {
            let RequestStatus::Loading { query } = &state.status else {
                return Err(TransitionError::InvalidTransition(format!(
                    "answer received while {:?}",
                    state.status
                )));
            };

            // Phase 2: commit the response
            let response = Message::response(answer.content.clone());
            let mut new_state = state.clone();
            new_state.messages.push(response.clone());
            new_state.response = Some(answer);
            new_state.status = RequestStatus::Idle;

            Ok(TransitionResult::new(new_state).with_effects([
                Effect::persist_exchange(Message::query(query.clone()), response),
                Effect::PublishState,
                Effect::ScrollToLatest,
            ]))
        }

        Event::QueryFailed { reason: _ } => {
            if !state.status.is_loading() {
                return Err(TransitionError::InvalidTransition(format!(
                    "failure received while {:?}",
                    state.status
                )));
            }

            let mut new_state = state.clone();
            new_state.status = RequestStatus::Error {
                message: REQUEST_FAILED_MESSAGE.to_string(),
            };
            Ok(TransitionResult::new(new_state)
                .with_effects([Effect::PublishState, Effect::ScrollToLatest]))
        }
    }
}
