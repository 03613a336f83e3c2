//! Conversation state types

use crate::query::{Answer, AnswerShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-facing text for any failed exchange
pub const REQUEST_FAILED_MESSAGE: &str = "Failed to fetch data.";

// ============================================================================
// Messages
// ============================================================================

/// Which side of an exchange a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Query,
    Response,
}

/// One turn in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn query(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Query,
            content: content.into(),
        }
    }

    pub fn response(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Response,
            content: content.into(),
        }
    }

    pub fn is_query(&self) -> bool {
        self.kind == MessageKind::Query
    }
}

// ============================================================================
// Request Status
// ============================================================================

/// Status of the single request slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestStatus {
    /// Ready for input
    #[default]
    Idle,

    /// Request in flight for `query`
    Loading { query: String },

    /// Last request failed; the UI shows `message`
    Error { message: String },
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading { .. })
    }

    #[allow(dead_code)] // Used in tests
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestStatus::Error { message } => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Everything the view projects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConvState {
    /// Exchanged messages in insertion order
    pub messages: Vec<Message>,
    /// Uncommitted input text
    pub pending_input: String,
    pub status: RequestStatus,
    /// Most recent successful answer, cleared by reset
    #[serde(default)]
    pub response: Option<Answer>,
}

impl ConvState {
    /// Seed a state from persisted history
    #[allow(dead_code)] // Used in tests
    pub fn with_history(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Query texts in submission order
    pub fn previous_queries(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.is_query())
            .map(|m| m.content.as_str())
    }
}

// ============================================================================
// Context
// ============================================================================

/// Which flavor of the client is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Message list over `{ answer }` responses, full conversation persisted
    #[default]
    Chat,
    /// Query form with reset, whole-body answers, query list persisted
    Form,
}

impl Variant {
    /// Durable store key for this variant's history
    pub fn storage_key(self) -> &'static str {
        match self {
            Variant::Chat => "previousConversations",
            Variant::Form => "previousQueries",
        }
    }

    /// Where the answer lives in a query service response
    pub fn answer_shape(self) -> AnswerShape {
        match self {
            Variant::Chat => AnswerShape::AnswerField,
            Variant::Form => AnswerShape::WholeBody,
        }
    }

    pub fn supports_reset(self) -> bool {
        matches!(self, Variant::Form)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Chat => f.write_str("chat"),
            Variant::Form => f.write_str("form"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Variant::Chat),
            "form" => Ok(Variant::Form),
            other => Err(format!("unknown variant '{other}' (expected 'chat' or 'form')")),
        }
    }
}

/// Immutable configuration for a conversation
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub variant: Variant,
}

impl ConvContext {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }
}
