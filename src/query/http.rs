//! HTTP query service
//!
//! POSTs `{ "query": ... }` as JSON to a fixed URL.

use super::{Answer, AnswerShape, QueryError, QueryService};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Query service over HTTP
pub struct HttpQueryService {
    client: Client,
    url: String,
    shape: AnswerShape,
}

impl HttpQueryService {
    /// No request timeout: a hung backend leaves the request pending
    pub fn new(url: impl Into<String>, shape: AnswerShape) -> Result<Self, QueryError> {
        let client = Client::builder()
            .build()
            .map_err(|e| QueryError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            shape,
        })
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn ask(&self, query: &str) -> Result<Answer, QueryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    QueryError::network(format!("Connection failed: {e}"))
                } else {
                    QueryError::network(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(QueryError::status(status.as_u16(), &body));
        }

        Answer::decode(&body, self.shape)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
