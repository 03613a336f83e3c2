//! Effects produced by state transitions

use crate::state_machine::state::Message;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read persisted history from the durable store
    LoadHistory,

    /// Ask the query service (spawns as background task)
    RequestAnswer { query: String },

    /// Append a completed exchange to the durable store
    PersistExchange { messages: Vec<Message> },

    /// Push the new state to the view
    PublishState,

    /// Ask the view to show the newest message
    ScrollToLatest,
}

impl Effect {
    pub fn request_answer(query: impl Into<String>) -> Self {
        Effect::RequestAnswer {
            query: query.into(),
        }
    }

    pub fn persist_exchange(query: Message, response: Message) -> Self {
        Effect::PersistExchange {
            messages: vec![query, response],
        }
    }
}
