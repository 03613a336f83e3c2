//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::state_machine::state::{Message, Variant};
use crate::store::{HistoryFormat, KvStore};
use async_trait::async_trait;
use std::sync::Arc;

/// Durable history of completed exchanges
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Read everything persisted so far, oldest first
    async fn load(&self) -> Result<Vec<Message>, String>;

    /// Append messages after the existing history
    async fn append(&self, messages: &[Message]) -> Result<(), String>;
}

#[async_trait]
impl<T: HistoryStore + ?Sized> HistoryStore for Arc<T> {
    async fn load(&self) -> Result<Vec<Message>, String> {
        (**self).load().await
    }

    async fn append(&self, messages: &[Message]) -> Result<(), String> {
        (**self).append(messages).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use a `KvStore` key as history
#[derive(Clone)]
pub struct KvHistoryStore {
    store: KvStore,
    key: &'static str,
    format: HistoryFormat,
}

impl KvHistoryStore {
    pub fn new(store: KvStore, key: &'static str, format: HistoryFormat) -> Self {
        Self { store, key, format }
    }

    /// The key and format each variant persists under
    pub fn for_variant(store: KvStore, variant: Variant) -> Self {
        let format = match variant {
            Variant::Chat => HistoryFormat::Conversation,
            Variant::Form => HistoryFormat::QueryList,
        };
        Self::new(store, variant.storage_key(), format)
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &KvStore {
        &self.store
    }
}

#[async_trait]
impl HistoryStore for KvHistoryStore {
    async fn load(&self) -> Result<Vec<Message>, String> {
        self.store
            .load_history(self.key, self.format)
            .map_err(|e| e.to_string())
    }

    async fn append(&self, messages: &[Message]) -> Result<(), String> {
        let len = self
            .store
            .append_history(self.key, self.format, messages)
            .map_err(|e| e.to_string())?;
        tracing::debug!(key = self.key, len, "History persisted");
        Ok(())
    }
}
