//! Pure state transition function
//!
//! Given the same state, flow, context and event this always produces the same
//! result, and it performs no I/O.

use super::action::{Action, RejectReason};
use super::event::{Event, TurnContext};
use super::state::{ConversationSession, WizardState};
use super::step::FlowDefinition;
use crate::report::{escape_html, ReportRecord};

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: WizardState,
    pub action: Action,
}

impl TransitionResult {
    pub fn new(state: WizardState, action: Action) -> Self {
        Self {
            new_state: state,
            action,
        }
    }
}

pub fn transition(
    state: &WizardState,
    flow: &FlowDefinition,
    context: &TurnContext,
    event: Event,
) -> TransitionResult {
    match (state, event) {
        // Start always begins a fresh record, dropping any run in progress
        (
            _,
            Event::Start {
                session_options,
                role,
            },
        ) => start(flow, context, session_options, role.as_deref()),

        (WizardState::Idle, Event::Cancel | Event::Answer { .. }) => TransitionResult::new(
            WizardState::Idle,
            Action::rejected(RejectReason::NotStarted),
        ),

        (WizardState::Collecting(_), Event::Cancel) => {
            TransitionResult::new(WizardState::Idle, Action::Cancelled)
        }

        (WizardState::Collecting(session), Event::Answer { text }) => {
            answer(flow, context, session, text)
        }
    }
}

fn start(
    flow: &FlowDefinition,
    context: &TurnContext,
    session_options: Vec<String>,
    role: Option<&str>,
) -> TransitionResult {
    let session_options = if flow.uses_session_catalog() {
        if session_options.is_empty() {
            return TransitionResult::new(
                WizardState::Idle,
                Action::rejected(RejectReason::NoSessionsAvailable),
            );
        }
        session_options
    } else {
        Vec::new()
    };

    let greeting = role.map(|role| {
        format!(
            "👋 {}\n🎭 Role: {}",
            escape_html(&context.user.display_name),
            escape_html(role)
        )
    });

    let session = ConversationSession::new(context.user.user_id, session_options, greeting);
    let prompt = flow.prompt_for(&session);
    TransitionResult::new(WizardState::Collecting(session), Action::ShowPrompt(prompt))
}

fn answer(
    flow: &FlowDefinition,
    context: &TurnContext,
    session: &ConversationSession,
    text: String,
) -> TransitionResult {
    let def = flow.definition(session.position);

    let value = if def.options.is_menu() {
        let selected = flow
            .options_for(session.position, session)
            .iter()
            .find(|option| option.as_str() == text.trim());
        match selected {
            Some(option) => option.clone(),
            None => {
                return TransitionResult::new(
                    WizardState::Collecting(session.clone()),
                    Action::Rejected {
                        reason: RejectReason::InvalidOption,
                        reprompt: Some(flow.prompt_for(session)),
                    },
                );
            }
        }
    } else {
        text
    };

    let mut next = session.clone();
    next.answers.insert(def.step, value);
    next.position += 1;

    if next.position == flow.len() {
        let record = ReportRecord::new(next.answers, &context.user.display_name, context.now);
        TransitionResult::new(WizardState::Idle, Action::ReportReady(record))
    } else {
        let prompt = flow.prompt_for(&next);
        TransitionResult::new(WizardState::Collecting(next), Action::ShowPrompt(prompt))
    }
}
