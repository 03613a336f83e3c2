//! View-side application state
//!
//! Holds the latest controller snapshot plus the bits only the terminal cares
//! about: the edit buffer, scroll position and a transient notice.

use crate::runtime::UiEvent;
use crate::state_machine::state::Variant;
use crate::state_machine::{ConvState, Event};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the draw loop should do after a key press
#[derive(Debug)]
pub enum Action {
    Send(Event),
    Quit,
}

pub struct App {
    pub variant: Variant,
    pub endpoint: String,
    /// Latest state published by the runtime
    pub state: ConvState,
    /// Edit buffer; every change is mirrored to the controller
    pub input: String,
    /// First visible line of the message pane
    pub scroll: u16,
    /// Keep the newest message in view
    pub follow: bool,
    /// Largest useful `scroll`, as of the last draw
    pub max_scroll: u16,
    /// Rejection or storage warning, cleared by the next key
    pub notice: Option<String>,
    pub animation_frame: u8,
}

impl App {
    pub fn new(variant: Variant, endpoint: impl Into<String>) -> Self {
        Self {
            variant,
            endpoint: endpoint.into(),
            state: ConvState::default(),
            input: String::new(),
            scroll: 0,
            follow: true,
            max_scroll: 0,
            notice: None,
            animation_frame: 0,
        }
    }

    pub fn apply(&mut self, update: UiEvent) {
        match update {
            UiEvent::StateChange { state } => self.state = state,
            UiEvent::ScrollToLatest => self.follow = true,
            UiEvent::Rejected { message } | UiEvent::StoreWarning { message } => {
                self.notice = Some(message);
            }
        }
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        self.notice = None;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('c') if ctrl => Some(Action::Quit),

            KeyCode::Char('r') if ctrl => {
                // Ctrl-R is inert where reset makes no sense
                if !self.variant.supports_reset() || self.state.status.is_loading() {
                    return None;
                }
                self.input.clear();
                Some(Action::Send(Event::Reset))
            }

            KeyCode::Enter => {
                // The submit control is disabled while a request is in flight
                if self.state.status.is_loading() {
                    return None;
                }
                let text = if self.input.trim().is_empty() {
                    self.input.clone()
                } else {
                    std::mem::take(&mut self.input)
                };
                Some(Action::Send(Event::Submit { text }))
            }

            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                Some(self.input_changed())
            }

            KeyCode::Backspace => {
                self.input.pop()?;
                Some(self.input_changed())
            }

            KeyCode::Up => {
                self.scroll_up(1);
                None
            }
            KeyCode::Down => {
                self.scroll_down(1);
                None
            }
            KeyCode::PageUp => {
                self.scroll_up(10);
                None
            }
            KeyCode::PageDown => {
                self.scroll_down(10);
                None
            }
            KeyCode::End => {
                self.follow = true;
                None
            }

            _ => None,
        }
    }

    fn input_changed(&self) -> Action {
        Action::Send(Event::InputChanged {
            text: self.input.clone(),
        })
    }

    fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        self.follow = self.scroll >= self.max_scroll;
    }
}
