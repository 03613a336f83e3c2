//! Query service abstraction
//!
//! One operation: send a natural-language query, get an answer back.

mod error;
mod http;

pub use error::{QueryError, QueryErrorKind};
pub use http::HttpQueryService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Common interface for query backends
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn ask(&self, query: &str) -> Result<Answer, QueryError>;

    /// Where requests go, for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: QueryService + ?Sized> QueryService for Arc<T> {
    async fn ask(&self, query: &str) -> Result<Answer, QueryError> {
        (**self).ask(query).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

// ============================================================================
// Answers
// ============================================================================

/// Where the answer sits in a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerShape {
    /// `{ "answer": "..." }`
    AnswerField,
    /// The body itself is the answer
    WholeBody,
}

/// One row of structured answer data, keys in the order the body gave them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Record {
    pub fields: Vec<(String, String)>,
}

/// A decoded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Answer {
    /// Text shown as the response message
    pub content: String,
    /// Structured rows when the body was an object or a list of objects
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Answer {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            records: Vec::new(),
        }
    }

    /// Decode a response body
    pub fn decode(body: &str, shape: AnswerShape) -> Result<Self, QueryError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| QueryError::malformed(format!("Response is not JSON: {e}")))?;

        match shape {
            AnswerShape::AnswerField => {
                let content = value
                    .get("answer")
                    .and_then(Value::as_str)
                    .ok_or_else(|| QueryError::malformed("Response has no string 'answer' field"))?;
                Ok(Self::text(content))
            }
            AnswerShape::WholeBody => Ok(Self {
                content: display_value(&value),
                records: extract_records(&value),
            }),
        }
    }
}

/// Render a JSON value for display; strings are shown without quotes
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
    }
}

fn extract_records(value: &Value) -> Vec<Record> {
    let record = |map: &serde_json::Map<String, Value>| Record {
        fields: map
            .iter()
            .map(|(k, v)| (k.clone(), display_value(v)))
            .collect(),
    };

    match value {
        Value::Object(map) => vec![record(map)],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_object)
            .map(record)
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// Logging wrapper
// ============================================================================

/// Logging wrapper for query services
pub struct LoggingService {
    inner: Arc<dyn QueryService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn QueryService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl QueryService for LoggingService {
    async fn ask(&self, query: &str) -> Result<Answer, QueryError> {
        let start = std::time::Instant::now();
        let result = self.inner.ask(query).await;
        let duration = start.elapsed();

        match &result {
            Ok(answer) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    answer_len = answer.content.len(),
                    records = answer.records.len(),
                    "Query completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.label(),
                    error = %e.message,
                    "Query failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
