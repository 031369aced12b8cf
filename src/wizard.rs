//! Shift report wizard
//!
//! A linear conversation state machine. The pure `transition` function maps
//! (state, event) to (new state, action); the `Controller` owns the per-user
//! session map and applies transitions.

mod action;
mod controller;
pub mod event;
pub mod state;
pub mod step;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use action::{Action, Prompt, RejectReason};
pub use controller::Controller;
pub use event::{Event, InputKind, TurnContext, UserIdentity};
pub use state::{Answers, ConversationSession, UserId, WizardState};
pub use step::{FlowDefinition, FlowError, OptionSource, Step, StepDefinition};
pub use transition::{transition, TransitionResult};
