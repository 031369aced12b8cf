//! Inputs that drive the wizard

use super::state::UserId;
use chrono::NaiveDateTime;

/// Who sent the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: UserId,
    pub display_name: String,
}

impl UserIdentity {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// Coarse classification of raw inbound text, before any I/O is done for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Start,
    Cancel,
    Answer,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start trigger. `session_options` is what the session catalog returned
    /// for this user and is ignored when the flow uses a fixed session menu.
    Start {
        session_options: Vec<String>,
        role: Option<String>,
    },
    Cancel,
    Answer { text: String },
}

impl Event {
    pub fn answer(text: impl Into<String>) -> Self {
        Event::Answer { text: text.into() }
    }

    /// Start trigger for a flow with a fixed session menu
    pub fn start() -> Self {
        Event::Start {
            session_options: vec![],
            role: None,
        }
    }
}

/// Per-turn facts the transition needs but must not fetch itself
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub user: UserIdentity,
    pub now: NaiveDateTime,
}

impl TurnContext {
    pub fn new(user: UserIdentity, now: NaiveDateTime) -> Self {
        Self { user, now }
    }
}
