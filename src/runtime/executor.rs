//! Conversation runtime executor

use super::traits::HistoryStore;
use super::UiEvent;

use crate::query::QueryService;
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event, TransitionError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Generic conversation runtime that can work with any history store and query service
pub struct ConversationRuntime<H, Q>
where
    H: HistoryStore + Clone + 'static,
    Q: QueryService + 'static,
{
    context: ConvContext,
    state: ConvState,
    store: H,
    query_service: Arc<Q>,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<UiEvent>,
    /// Stops the event loop and abandons any running request
    shutdown: CancellationToken,
}

impl<H, Q> ConversationRuntime<H, Q>
where
    H: HistoryStore + Clone + 'static,
    Q: QueryService + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: ConvContext,
        state: ConvState,
        store: H,
        query_service: Q,
        event_rx: mpsc::Receiver<Event>,
        event_tx: mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<UiEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            context,
            state,
            store,
            query_service: Arc::new(query_service),
            event_rx,
            event_tx,
            broadcast_tx,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            variant = %self.context.variant,
            endpoint = %self.query_service.endpoint(),
            "Starting conversation runtime"
        );

        // History is read exactly once, before any user event
        self.handle(Event::Mount).await;

        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => break,

                Some(event) = self.event_rx.recv() => {
                    self.handle(event).await;
                }

                else => break,
            }
        }

        tracing::info!(
            messages = self.state.messages.len(),
            "Conversation runtime stopped"
        );
    }

    async fn handle(&mut self, event: Event) {
        if let Err(e) = self.process_event(event).await {
            tracing::warn!(error = %e, "Event rejected");
        }
    }

    async fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        // We need to process events in a loop to handle chained effects
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            let event_name = current_event.name();

            // Pure state transition
            let result = match transition(&self.state, &self.context, current_event) {
                Ok(r) => r,
                Err(e) => {
                    // Transition errors are user-facing (e.g., "request in flight")
                    let _ = self.broadcast_tx.send(UiEvent::Rejected {
                        message: e.to_string(),
                    });
                    return Err(e);
                }
            };

            tracing::debug!(
                event = event_name,
                effects = result.effects.len(),
                messages = result.new_state.messages.len(),
                "Transition applied"
            );
            self.state = result.new_state;

            // Execute effects and collect generated events
            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::LoadHistory => match self.store.load().await {
                Ok(messages) => {
                    tracing::info!(count = messages.len(), "Loaded history");
                    Some(Event::HistoryLoaded { messages })
                }
                Err(e) => {
                    // Unreadable history behaves like an empty one
                    tracing::warn!(error = %e, "Failed to load history");
                    None
                }
            },

            Effect::RequestAnswer { query } => {
                // Spawn request as background task so the loop keeps serving events
                let query_service = self.query_service.clone();
                let event_tx = self.event_tx.clone();
                let cancel = self.shutdown.child_token();

                tokio::spawn(async move {
                    tracing::info!(query_len = query.len(), "Sending query (background)");

                    tokio::select! {
                        biased;

                        () = cancel.cancelled() => {
                            tracing::info!("Query abandoned on shutdown");
                        }

                        result = query_service.ask(&query) => {
                            let event = match result {
                                Ok(answer) => Event::QueryAnswered { answer },
                                Err(e) => Event::QueryFailed { reason: e.to_string() },
                            };
                            let _ = event_tx.send(event).await;
                        }
                    }
                });
                None
            }

            Effect::PersistExchange { messages } => {
                if let Err(e) = self.store.append(&messages).await {
                    // The exchange stays on screen; only durability is lost
                    tracing::error!(error = %e, "Failed to persist exchange");
                    let _ = self.broadcast_tx.send(UiEvent::StoreWarning {
                        message: format!("History not saved: {e}"),
                    });
                }
                None
            }

            Effect::PublishState => {
                let _ = self.broadcast_tx.send(UiEvent::StateChange {
                    state: self.state.clone(),
                });
                None
            }

            Effect::ScrollToLatest => {
                let _ = self.broadcast_tx.send(UiEvent::ScrollToLatest);
                None
            }
        }
    }
}
