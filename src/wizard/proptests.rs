//! Property-based tests for the wizard
//!
//! These tests verify key invariants hold across all possible inputs.

use super::step::{Step, DEFAULT_SESSION_NAMES, DEFAULT_SHIFT_WINDOWS};
use super::transition::transition;
use super::*;
use crate::report::{format_report, ReportLayout, ReportRecord};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn flow() -> FlowDefinition {
    FlowDefinition::shift_report(
        Some(DEFAULT_SESSION_NAMES.iter().map(ToString::to_string).collect()),
        DEFAULT_SHIFT_WINDOWS.iter().map(ToString::to_string).collect(),
    )
    .unwrap()
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 12, 13)
        .unwrap()
        .and_hms_opt(9, 41, 0)
        .unwrap()
}

fn context(user_id: UserId) -> TurnContext {
    TurnContext::new(UserIdentity::new(user_id, format!("user {user_id}")), now())
}

/// Seven answers that the standard flow accepts, in order
fn script(session: usize, shift: usize, text: &[String]) -> Vec<String> {
    let mut answers = vec![
        DEFAULT_SESSION_NAMES[session].to_string(),
        DEFAULT_SHIFT_WINDOWS[shift].to_string(),
    ];
    answers.extend(text.iter().cloned());
    answers
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_free_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 <>&.,!]{0,24}"
}

fn arb_script() -> impl Strategy<Value = Vec<String>> {
    (
        0..DEFAULT_SESSION_NAMES.len(),
        0..DEFAULT_SHIFT_WINDOWS.len(),
        proptest::collection::vec(arb_free_text(), 5),
    )
        .prop_map(|(session, shift, text)| script(session, shift, &text))
}

fn arb_answers() -> impl Strategy<Value = Answers> {
    proptest::collection::vec(arb_free_text(), 7).prop_map(|values| {
        let mut answers = Answers::default();
        for (step, value) in Step::ALL.into_iter().zip(values) {
            answers.insert(step, value);
        }
        answers
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Valid answers advance one step at a time and end in exactly one report
    #[test]
    fn prop_valid_walk_produces_complete_report(answers in arb_script()) {
        let flow = flow();
        let ctx = context(1);
        let mut state = transition(&WizardState::Idle, &flow, &ctx, Event::start()).new_state;

        for (i, answer) in answers.iter().enumerate() {
            let session = state.session().cloned();
            let result = transition(&state, &flow, &ctx, Event::answer(answer.clone()));

            if i + 1 < flow.len() {
                let session = session.unwrap();
                prop_assert_eq!(session.position, i);
                prop_assert!(matches!(result.action, Action::ShowPrompt(_)));
                prop_assert_eq!(result.new_state.session().unwrap().position, i + 1);
            } else {
                prop_assert!(result.new_state.is_idle());
                match result.action {
                    Action::ReportReady(record) => {
                        prop_assert_eq!(record.answers.len(), flow.len());
                        for (step, expected) in Step::ALL.iter().zip(&answers) {
                            prop_assert_eq!(record.answers.get(*step), Some(expected.as_str()));
                        }
                    }
                    other => prop_assert!(false, "expected report, got {:?}", other),
                }
            }
            state = result.new_state;
        }
    }

    // Cancel from any step discards the session without a report
    #[test]
    fn prop_cancel_at_any_step(answers in arb_script(), stop in 0usize..7) {
        let flow = flow();
        let ctx = context(1);
        let mut state = transition(&WizardState::Idle, &flow, &ctx, Event::start()).new_state;
        for answer in &answers[..stop] {
            state = transition(&state, &flow, &ctx, Event::answer(answer.clone())).new_state;
        }

        let result = transition(&state, &flow, &ctx, Event::Cancel);
        prop_assert!(result.new_state.is_idle());
        prop_assert_eq!(result.action, Action::Cancelled);
    }

    // An answer outside the menu leaves the session untouched and re-issues the prompt
    #[test]
    fn prop_invalid_option_is_idempotent(
        answers in arb_script(),
        on_shift in any::<bool>(),
        bogus in "[a-z]{1,12}",
    ) {
        let flow = flow();
        let ctx = context(1);
        let mut state = transition(&WizardState::Idle, &flow, &ctx, Event::start()).new_state;
        if on_shift {
            state = transition(&state, &flow, &ctx, Event::answer(answers[0].clone())).new_state;
        }
        let before = state.session().cloned().unwrap();

        let result = transition(&state, &flow, &ctx, Event::answer(bogus));
        prop_assert_eq!(result.new_state.session(), Some(&before));
        prop_assert_eq!(
            result.action,
            Action::Rejected {
                reason: RejectReason::InvalidOption,
                reprompt: Some(flow.prompt_for(&before)),
            }
        );
    }

    // Formatting is a pure function of the record
    #[test]
    fn prop_format_is_deterministic(answers in arb_answers(), name in arb_free_text()) {
        let record = ReportRecord::new(answers, &name, now());
        for layout in [ReportLayout::Split, ReportLayout::Combined] {
            prop_assert_eq!(format_report(&record, layout), format_report(&record.clone(), layout));
        }
        let combined = format_report(&record, ReportLayout::Combined);
        prop_assert!(combined.secondary.is_none());
        prop_assert!(!combined.primary.contains("<script"));
    }

    // Interleaving two users never mixes their answers
    #[test]
    fn prop_users_are_isolated(
        first in arb_script(),
        second in arb_script(),
        order in proptest::collection::vec(any::<bool>(), 16),
    ) {
        let mut controller = Controller::new(std::sync::Arc::new(flow()));
        let users = [UserIdentity::new(1, "one"), UserIdentity::new(2, "two")];
        let scripts = [&first, &second];
        let mut cursor = [0usize; 2];
        let mut reports: [Option<ReportRecord>; 2] = [None, None];

        for pick_second in order {
            let mut who = usize::from(pick_second);
            if cursor[who] > scripts[who].len() {
                who = 1 - who;
            }
            let event = match cursor[who] {
                0 => Event::start(),
                n => Event::answer(scripts[who][n - 1].clone()),
            };
            cursor[who] += 1;
            if let Action::ReportReady(record) = controller.handle_input(&users[who], event, now()) {
                reports[who] = Some(record);
            }
        }

        for who in 0..2 {
            let report = reports[who].as_ref().unwrap();
            prop_assert_eq!(&report.user_display_name, &users[who].display_name);
            for (step, expected) in Step::ALL.iter().zip(scripts[who].iter()) {
                prop_assert_eq!(report.answers.get(*step), Some(expected.as_str()));
            }
        }
        prop_assert_eq!(controller.active_sessions(), 0);
    }
}
