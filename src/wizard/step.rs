//! Step catalog: the declared order of questions and what each one accepts

use super::action::Prompt;
use super::event::InputKind;
use super::state::ConversationSession;
use crate::report::escape_html;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const START_TRIGGER: &str = "/start";
pub const CANCEL_COMMAND: &str = "/cancel";
pub const CANCEL_LABEL: &str = "❌ Cancel";

pub const DEFAULT_SESSION_NAMES: &[&str] = &["Alina 1 OnlyFans", "Alina 1 Fansly"];
pub const DEFAULT_SHIFT_WINDOWS: &[&str] = &[
    "16:00 - 00:00",
    "00:00 - 06:00",
    "06:00 - 12:00",
    "12:00 - 18:00",
];

/// One question of the wizard. Each step fills exactly one report field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Session,
    Shift,
    Balance,
    Checklist,
    Comment,
    Fans,
    Tops,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Session,
        Step::Shift,
        Step::Balance,
        Step::Checklist,
        Step::Comment,
        Step::Fans,
        Step::Tops,
    ];

    /// Name of the answer field this step populates
    pub fn field_name(self) -> &'static str {
        match self {
            Step::Session => "session",
            Step::Shift => "shift",
            Step::Balance => "balance",
            Step::Checklist => "checklist",
            Step::Comment => "comment",
            Step::Fans => "fans",
            Step::Tops => "tops",
        }
    }

    /// Label used when echoing an accepted answer back to the user
    fn echo_label(self) -> &'static str {
        match self {
            Step::Session => "📅 Session",
            Step::Shift => "⏰ Shift",
            Step::Balance => "💰 Balance",
            Step::Checklist => "📋 Checklist",
            Step::Comment => "💬 Comment",
            Step::Fans => "👥 Fans",
            Step::Tops => "🏆 Tops",
        }
    }
}

/// Where a step's selectable options come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionSource {
    /// Any text is accepted
    FreeText,
    /// Only one of these labels is accepted
    Fixed(Vec<String>),
    /// Labels are resolved per user when the flow starts
    SessionCatalog,
}

impl OptionSource {
    pub fn is_menu(&self) -> bool {
        !matches!(self, OptionSource::FreeText)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub step: Step,
    pub prompt: String,
    pub options: OptionSource,
}

impl StepDefinition {
    pub fn new(step: Step, prompt: impl Into<String>, options: OptionSource) -> Self {
        Self {
            step,
            prompt: prompt.into(),
            options,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("flow has no steps")]
    Empty,
    #[error("step {0:?} is declared more than once")]
    DuplicateStep(Step),
    #[error("step {0:?} has an empty option list")]
    NoOptions(Step),
}

/// The full, ordered wizard definition. Built once at startup and shared by
/// reference with the controller.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    steps: Vec<StepDefinition>,
    start_trigger: String,
    cancel_command: String,
    cancel_label: String,
}

impl FlowDefinition {
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, FlowError> {
        if steps.is_empty() {
            return Err(FlowError::Empty);
        }
        let mut seen = HashSet::new();
        for def in &steps {
            if !seen.insert(def.step) {
                return Err(FlowError::DuplicateStep(def.step));
            }
            if let OptionSource::Fixed(options) = &def.options {
                if options.is_empty() {
                    return Err(FlowError::NoOptions(def.step));
                }
            }
        }
        Ok(Self {
            steps,
            start_trigger: START_TRIGGER.to_string(),
            cancel_command: CANCEL_COMMAND.to_string(),
            cancel_label: CANCEL_LABEL.to_string(),
        })
    }

    /// The seven-question shift report.
    ///
    /// `session_names` of `None` means the session list is looked up in the
    /// session catalog when the user starts the flow.
    pub fn shift_report(
        session_names: Option<Vec<String>>,
        shift_windows: Vec<String>,
    ) -> Result<Self, FlowError> {
        let session_source = match session_names {
            Some(names) => OptionSource::Fixed(names),
            None => OptionSource::SessionCatalog,
        };
        Self::new(vec![
            StepDefinition::new(Step::Session, "Select a session:", session_source),
            StepDefinition::new(
                Step::Shift,
                "⏰ Select a shift:",
                OptionSource::Fixed(shift_windows),
            ),
            StepDefinition::new(
                Step::Balance,
                "💰 Enter the <b>shift balance</b>:",
                OptionSource::FreeText,
            ),
            StepDefinition::new(
                Step::Checklist,
                "📋 Checklist completed? (yes/no/partially):",
                OptionSource::FreeText,
            ),
            StepDefinition::new(
                Step::Comment,
                "💬 Enter a comment on the shift:",
                OptionSource::FreeText,
            ),
            StepDefinition::new(Step::Fans, "👥 Notes on fans:", OptionSource::FreeText),
            StepDefinition::new(Step::Tops, "🏆 Notes on tops:", OptionSource::FreeText),
        ])
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Step definition at `position`.
    ///
    /// # Panics
    /// A position outside the declared sequence is a controller bug.
    pub fn definition(&self, position: usize) -> &StepDefinition {
        &self.steps[position]
    }

    /// Whether any step takes its options from the session catalog
    pub fn uses_session_catalog(&self) -> bool {
        self.steps
            .iter()
            .any(|def| def.options == OptionSource::SessionCatalog)
    }

    pub fn cancel_label(&self) -> &str {
        &self.cancel_label
    }

    pub fn start_trigger(&self) -> &str {
        &self.start_trigger
    }

    /// Classify raw inbound text into start / cancel / answer
    pub fn classify(&self, raw: &str) -> InputKind {
        let text = raw.trim();
        // "/start@SomeBot" is how group chats address commands
        let command = text.split('@').next().unwrap_or(text);
        if command == self.start_trigger {
            InputKind::Start
        } else if command == self.cancel_command || text == self.cancel_label {
            InputKind::Cancel
        } else {
            InputKind::Answer
        }
    }

    /// Options accepted at `position` for this session (empty = free text)
    pub fn options_for<'a>(
        &'a self,
        position: usize,
        session: &'a ConversationSession,
    ) -> &'a [String] {
        match &self.definition(position).options {
            OptionSource::FreeText => &[],
            OptionSource::Fixed(options) => options,
            OptionSource::SessionCatalog => &session.session_options,
        }
    }

    /// Render the prompt for the session's current step.
    ///
    /// Deterministic in the session contents, so a rejected answer re-issues
    /// exactly the prompt that was shown before.
    pub fn prompt_for(&self, session: &ConversationSession) -> Prompt {
        let position = session.position;
        let def = self.definition(position);
        let mut text = String::new();

        if position == 0 {
            if let Some(greeting) = &session.greeting {
                text.push_str(greeting);
                text.push_str("\n\n");
            }
        } else if self.definition(position - 1).options.is_menu() {
            // Echo the menu answers given so far
            for prior in &self.steps[..position] {
                if !prior.options.is_menu() {
                    continue;
                }
                if let Some(value) = session.answers.get(prior.step) {
                    text.push_str(&format!(
                        "✅ {}: {}\n",
                        prior.step.echo_label(),
                        escape_html(value)
                    ));
                }
            }
            text.push('\n');
        }
        text.push_str(&def.prompt);

        Prompt {
            text,
            options: self.options_for(position, session).to_vec(),
            cancel_label: self.cancel_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_flow() -> FlowDefinition {
        FlowDefinition::shift_report(
            Some(DEFAULT_SESSION_NAMES.iter().map(ToString::to_string).collect()),
            DEFAULT_SHIFT_WINDOWS.iter().map(ToString::to_string).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_shift_report_declares_steps_in_order() {
        let flow = standard_flow();
        let order: Vec<Step> = flow.steps().iter().map(|d| d.step).collect();
        assert_eq!(order, Step::ALL.to_vec());
    }

    #[test]
    fn test_rejects_duplicate_steps() {
        let result = FlowDefinition::new(vec![
            StepDefinition::new(Step::Balance, "a", OptionSource::FreeText),
            StepDefinition::new(Step::Balance, "b", OptionSource::FreeText),
        ]);
        assert_eq!(result.unwrap_err(), FlowError::DuplicateStep(Step::Balance));
    }

    #[test]
    fn test_rejects_empty_fixed_options() {
        let result = FlowDefinition::shift_report(Some(vec![]), vec!["x".into()]);
        assert_eq!(result.unwrap_err(), FlowError::NoOptions(Step::Session));
    }

    #[test]
    fn test_rejects_empty_flow() {
        assert_eq!(FlowDefinition::new(vec![]).unwrap_err(), FlowError::Empty);
    }

    #[test]
    fn test_classify_commands() {
        let flow = standard_flow();
        assert_eq!(flow.classify("/start"), InputKind::Start);
        assert_eq!(flow.classify("/start@ShiftBot"), InputKind::Start);
        assert_eq!(flow.classify("/cancel"), InputKind::Cancel);
        assert_eq!(flow.classify(CANCEL_LABEL), InputKind::Cancel);
        assert_eq!(flow.classify("120"), InputKind::Answer);
        assert_eq!(flow.classify("start"), InputKind::Answer);
    }

    #[test]
    fn test_catalog_source_detection() {
        let dynamic = FlowDefinition::shift_report(None, vec!["a".into()]).unwrap();
        assert!(dynamic.uses_session_catalog());
        assert!(!standard_flow().uses_session_catalog());
    }

    #[test]
    fn test_prompt_echoes_menu_answers() {
        let flow = standard_flow();
        let mut session = ConversationSession::new(1, vec![], None);
        session.answers.insert(Step::Session, "Alina 1 OnlyFans".into());
        session.position = 1;

        let prompt = flow.prompt_for(&session);
        assert_eq!(
            prompt.text,
            "✅ 📅 Session: Alina 1 OnlyFans\n\n⏰ Select a shift:"
        );
        assert_eq!(prompt.options.len(), DEFAULT_SHIFT_WINDOWS.len());

        session.answers.insert(Step::Shift, "00:00 - 06:00".into());
        session.position = 2;
        let prompt = flow.prompt_for(&session);
        assert!(prompt.text.starts_with("✅ 📅 Session: Alina 1 OnlyFans\n✅ ⏰ Shift: 00:00 - 06:00\n\n"));
        assert!(prompt.options.is_empty());
    }

    #[test]
    fn test_free_text_prompt_has_no_echo() {
        let flow = standard_flow();
        let mut session = ConversationSession::new(1, vec![], None);
        session.position = 3;
        assert_eq!(
            flow.prompt_for(&session).text,
            "📋 Checklist completed? (yes/no/partially):"
        );
    }

    #[test]
    fn test_first_prompt_carries_greeting() {
        let flow = FlowDefinition::shift_report(None, vec!["a".into()]).unwrap();
        let session = ConversationSession::new(
            1,
            vec!["s1".into()],
            Some("👋 Kim\n🎭 Role: operator_of".into()),
        );
        let prompt = flow.prompt_for(&session);
        assert_eq!(prompt.text, "👋 Kim\n🎭 Role: operator_of\n\nSelect a session:");
        assert_eq!(prompt.options, vec!["s1".to_string()]);
    }
}
