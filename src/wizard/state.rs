//! Wizard state types

use super::step::Step;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transport-provided identity of the human participant
pub type UserId = i64;

/// Answers collected so far, keyed by the step that produced them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers(BTreeMap<Step, String>);

impl Answers {
    pub fn get(&self, step: Step) -> Option<&str> {
        self.0.get(&step).map(String::as_str)
    }

    pub fn insert(&mut self, step: Step, value: String) {
        self.0.insert(step, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, step: Step) -> bool {
        self.0.contains_key(&step)
    }

    /// Answers as (field name, value) pairs in step order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0
            .iter()
            .map(|(step, value)| (step.field_name(), value.as_str()))
    }
}

/// One user's in-progress run through the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub user_id: UserId,
    /// Index into the flow's step sequence of the question being asked
    pub position: usize,
    pub answers: Answers,
    /// Session names resolved from the catalog when the flow started
    #[serde(default)]
    pub session_options: Vec<String>,
    /// Shown above the first prompt
    #[serde(default)]
    pub greeting: Option<String>,
}

impl ConversationSession {
    pub fn new(user_id: UserId, session_options: Vec<String>, greeting: Option<String>) -> Self {
        Self {
            user_id,
            position: 0,
            answers: Answers::default(),
            session_options,
            greeting,
        }
    }
}

/// Per-user wizard state. `Complete` is never stored: finishing the last step
/// hands the record out and drops straight back to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WizardState {
    #[default]
    Idle,
    Collecting(ConversationSession),
}

impl WizardState {
    pub fn session(&self) -> Option<&ConversationSession> {
        match self {
            WizardState::Idle => None,
            WizardState::Collecting(session) => Some(session),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, WizardState::Idle)
    }
}
