//! Per-user session ownership

use super::action::Action;
use super::event::{Event, TurnContext, UserIdentity};
use super::state::{ConversationSession, UserId, WizardState};
use super::step::FlowDefinition;
use super::transition::transition;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns every active session and applies transitions to them.
///
/// Inputs for one user must be fed in order, one at a time; different users
/// never share state.
pub struct Controller {
    flow: Arc<FlowDefinition>,
    sessions: HashMap<UserId, ConversationSession>,
}

impl Controller {
    pub fn new(flow: Arc<FlowDefinition>) -> Self {
        Self {
            flow,
            sessions: HashMap::new(),
        }
    }

    pub fn flow(&self) -> &FlowDefinition {
        &self.flow
    }

    /// Handle one input. Never fails: every outcome is an `Action`.
    pub fn handle_input(&mut self, user: &UserIdentity, event: Event, now: NaiveDateTime) -> Action {
        let state = self
            .sessions
            .remove(&user.user_id)
            .map_or(WizardState::Idle, WizardState::Collecting);
        let context = TurnContext::new(user.clone(), now);

        let result = transition(&state, &self.flow, &context, event);

        if let WizardState::Collecting(session) = result.new_state {
            tracing::debug!(
                user_id = user.user_id,
                step = session.position,
                "Session advanced"
            );
            self.sessions.insert(user.user_id, session);
        }
        result.action
    }

    /// Put back a session snapshot taken before `handle_input`; `None` clears it
    pub fn restore(&mut self, user_id: UserId, session: Option<ConversationSession>) {
        match session {
            Some(session) => {
                tracing::debug!(user_id, step = session.position, "Session restored");
                self.sessions.insert(user_id, session);
            }
            None => {
                self.sessions.remove(&user_id);
            }
        }
    }

    pub fn session(&self, user_id: UserId) -> Option<&ConversationSession> {
        self.sessions.get(&user_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
