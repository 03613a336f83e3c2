//! Store schema and persisted history formats

use crate::state_machine::state::Message;
use chrono::{DateTime, Utc};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// A stored value with its last write time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// How a history list is serialized under its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFormat {
    /// JSON array of `{ "type", "content" }` messages
    Conversation,
    /// JSON array of query strings; responses are not kept
    QueryList,
}

impl HistoryFormat {
    pub fn decode(self, raw: &str) -> serde_json::Result<Vec<Message>> {
        match self {
            HistoryFormat::Conversation => serde_json::from_str(raw),
            HistoryFormat::QueryList => {
                let queries: Vec<String> = serde_json::from_str(raw)?;
                Ok(queries.into_iter().map(Message::query).collect())
            }
        }
    }

    pub fn encode(self, messages: &[Message]) -> serde_json::Result<String> {
        match self {
            HistoryFormat::Conversation => serde_json::to_string(messages),
            HistoryFormat::QueryList => {
                let queries: Vec<&str> = messages
                    .iter()
                    .filter(|m| m.is_query())
                    .map(|m| m.content.as_str())
                    .collect();
                serde_json::to_string(&queries)
            }
        }
    }
}
