//! Terminal front end
//!
//! Terminal setup and teardown, the input event pump, and the draw loop that
//! joins key presses with state published by the runtime.

mod app;
mod view;

pub use app::{Action, App};

use crate::runtime::{ConversationHandle, UiEvent};
use crossterm::{
    event::{self, Event as TermEvent, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stderr};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

pub type Tui = Terminal<CrosstermBackend<Stderr>>;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new(tick: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        // Spawn event reader task
        let tx_events = tx.clone();
        tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(evt) = reader.next().await {
                let app_event = match evt {
                    // Only handle key press events, not release
                    Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        AppEvent::Key(key)
                    }
                    Ok(TermEvent::Resize(..)) => AppEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "Terminal event stream failed");
                        break;
                    }
                };
                if tx_events.send(app_event).is_err() {
                    break;
                }
            }
        });

        // Tick drives the loading indicator
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

pub fn init() -> io::Result<Tui> {
    enable_raw_mode()?;
    execute!(io::stderr(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(io::stderr());
    Terminal::new(backend)
}

pub fn restore() -> io::Result<()> {
    execute!(io::stderr(), LeaveAlternateScreen)?;
    disable_raw_mode()
}

/// Install panic hook to restore terminal on panic
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        original_hook(panic_info);
    }));
}

/// Draw and dispatch until the user quits or the runtime goes away
pub async fn run(
    terminal: &mut Tui,
    app: &mut App,
    handle: &ConversationHandle,
    mut ui_rx: broadcast::Receiver<UiEvent>,
) -> io::Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(300));

    loop {
        terminal.draw(|frame| view::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(AppEvent::Key(key)) => match app.handle_key(key) {
                    Some(Action::Send(event)) => {
                        if !handle.send(event).await {
                            tracing::warn!("Runtime gone, leaving");
                            break;
                        }
                    }
                    Some(Action::Quit) => break,
                    None => {}
                },
                Some(AppEvent::Tick) => app.tick(),
                Some(AppEvent::Resize) => {}
                None => break,
            },

            update = ui_rx.recv() => match update {
                Ok(update) => app.apply(update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // The next StateChange carries the full state again
                    tracing::warn!(skipped, "View lagged behind runtime");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}
