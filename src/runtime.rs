//! Runtime for executing a conversation
//!
//! Owns the controller state, feeds it events from the view and from
//! background requests, and carries out the effects each transition returns.

mod executor;
pub mod traits;


pub use executor::ConversationRuntime;
pub use traits::*;

use crate::query::QueryService;
use crate::state_machine::{ConvContext, ConvState, Event};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Events sent to the view
#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Full state snapshot after a transition
    StateChange { state: ConvState },
    /// Bring the newest message into view
    ScrollToLatest,
    /// An event the controller refused, e.g. submit while loading
    Rejected { message: String },
    /// A completed exchange could not be saved
    StoreWarning { message: String },
}

/// Handle to interact with a running conversation
#[derive(Clone)]
pub struct ConversationHandle {
    pub event_tx: mpsc::Sender<Event>,
    shutdown: CancellationToken,
}

impl ConversationHandle {
    /// Send an event to the controller; false once the runtime is gone
    pub async fn send(&self, event: Event) -> bool {
        self.event_tx.send(event).await.is_ok()
    }

    /// Stop the runtime; an in-flight request is abandoned
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Start a runtime task
///
/// The returned receiver is subscribed before the task starts, so it sees
/// the state published once history is loaded.
pub fn start<H, Q>(
    context: ConvContext,
    store: H,
    query_service: Q,
) -> (ConversationHandle, broadcast::Receiver<UiEvent>, JoinHandle<()>)
where
    H: HistoryStore + Clone + 'static,
    Q: QueryService + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, broadcast_rx) = broadcast::channel(128);
    let shutdown = CancellationToken::new();

    let runtime = ConversationRuntime::new(
        context,
        ConvState::default(),
        store,
        query_service,
        event_rx,
        event_tx.clone(),
        broadcast_tx,
        shutdown.clone(),
    );

    let task = tokio::spawn(async move {
        runtime.run().await;
    });

    let handle = ConversationHandle {
        event_tx,
        shutdown,
    };
    (handle, broadcast_rx, task)
}
