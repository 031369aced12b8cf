//! Actions produced by state transitions

use crate::report::ReportRecord;
use thiserror::Error;

/// A question to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    /// Selectable labels; empty means free text is expected
    pub options: Vec<String>,
    pub cancel_label: String,
}

impl Prompt {
    /// Keyboard rows: one button per option, cancel always last
    pub fn keyboard(&self) -> Vec<String> {
        self.options
            .iter()
            .cloned()
            .chain(std::iter::once(self.cancel_label.clone()))
            .collect()
    }

    pub fn is_menu(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Why an input was not accepted. All of these are user-correctable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("not started")]
    NotStarted,
    #[error("invalid option")]
    InvalidOption,
    #[error("no sessions available")]
    NoSessionsAvailable,
}

/// What the caller should do after an input was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowPrompt(Prompt),
    Cancelled,
    ReportReady(ReportRecord),
    Rejected {
        reason: RejectReason,
        /// The unchanged current prompt, when a session is active
        reprompt: Option<Prompt>,
    },
}

impl Action {
    pub fn rejected(reason: RejectReason) -> Self {
        Action::Rejected {
            reason,
            reprompt: None,
        }
    }
}
