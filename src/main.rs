//! NLQ Chat - natural-language query client
//!
//! A terminal client that sends questions to a query service and keeps the
//! conversation in a local store across restarts.

mod config;
mod query;
mod runtime;
mod sanitize;
mod state_machine;
mod store;
mod tui;

use config::{AppConfig, DEFAULT_LOG_FILTER};
use query::{HttpQueryService, LoggingService};
use runtime::KvHistoryStore;
use state_machine::ConvContext;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use store::KvStore;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// The terminal is ours, so logs go to a file
fn init_logging(path: &Path) -> std::io::Result<WorkerGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration
    let config = AppConfig::from_env()?;
    let _log_guard = init_logging(&config.log_path)?;

    // Ensure store directory exists
    if let Some(parent) = config.store_path.parent() {
        fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.store_path.display(), "Opening store");
    let store = KvStore::open(&config.store_path)?;
    let history = KvHistoryStore::for_variant(store, config.variant);

    let http = HttpQueryService::new(&config.query_url, config.variant.answer_shape())?;
    let query_service = LoggingService::new(Arc::new(http));

    tracing::info!(
        variant = %config.variant,
        endpoint = %config.query_url,
        "Starting client"
    );

    let (handle, ui_rx, runtime_task) = runtime::start(
        ConvContext::new(config.variant),
        history,
        query_service,
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = tui::App::new(config.variant, config.query_url.clone());
    let result = tui::run(&mut terminal, &mut app, &handle, ui_rx).await;
    tui::restore()?;

    handle.shutdown();
    if tokio::time::timeout(Duration::from_secs(2), runtime_task)
        .await
        .is_err()
    {
        tracing::warn!("Runtime did not stop in time");
    }

    tracing::info!("Client exiting");
    result?;
    Ok(())
}
