//! Events that can occur in a conversation

use crate::query::Answer;
use crate::state_machine::state::Message;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Lifecycle
    /// The client started; read persisted history
    Mount,
    HistoryLoaded {
        messages: Vec<Message>,
    },

    // User events
    InputChanged {
        text: String,
    },
    Submit {
        text: String,
    },
    Reset,

    // Query service events
    QueryAnswered {
        answer: Answer,
    },
    QueryFailed {
        /// Diagnostic detail, logged but never shown
        reason: String,
    },
}

impl Event {
    #[allow(dead_code)] // Used in tests
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Mount => "mount",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::InputChanged { .. } => "input_changed",
            Event::Submit { .. } => "submit",
            Event::Reset => "reset",
            Event::QueryAnswered { .. } => "query_answered",
            Event::QueryFailed { .. } => "query_failed",
        }
    }
}
