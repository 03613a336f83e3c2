//! Startup configuration from environment variables

use crate::state_machine::state::Variant;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_QUERY_URL: &str = "http://localhost:3000/query";
pub const DEFAULT_LOG_FILTER: &str = "nlq_chat=info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("NLQ_VARIANT: {0}")]
    InvalidVariant(String),
    #[error("NLQ_QUERY_URL must be an http(s) URL, got '{0}'")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub query_url: String,
    pub variant: Variant,
    pub store_path: PathBuf,
    pub log_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; unset or empty values take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
        let data_dir = PathBuf::from(home).join(".nlq-chat");

        let query_url = get("NLQ_QUERY_URL").unwrap_or_else(|| DEFAULT_QUERY_URL.to_string());
        if !(query_url.starts_with("http://") || query_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(query_url));
        }

        let variant = match get("NLQ_VARIANT") {
            Some(v) => v.parse().map_err(ConfigError::InvalidVariant)?,
            None => Variant::default(),
        };

        Ok(Self {
            query_url,
            variant,
            store_path: get("NLQ_STORE_PATH")
                .map_or_else(|| data_dir.join("store.db"), PathBuf::from),
            log_path: get("NLQ_LOG_PATH")
                .map_or_else(|| data_dir.join("nlq-chat.log"), PathBuf::from),
        })
    }
}
