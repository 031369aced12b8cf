//! Report record and formatting
//!
//! Formatting is plain interpolation into a fixed template and cannot fail.
//! Output is Telegram HTML, so every user-supplied value is escaped.

use crate::wizard::{Answers, Step};
use chrono::NaiveDateTime;
use serde::Serialize;

pub const TIMESTAMP_FORMAT: &str = "%H:%M %d.%m";

/// A completed, immutable set of answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub answers: Answers,
    pub user_display_name: String,
    /// Completion time rendered as `HH:MM DD.MM`
    pub timestamp: String,
}

impl ReportRecord {
    pub fn new(answers: Answers, user_display_name: &str, completed_at: NaiveDateTime) -> Self {
        Self {
            answers,
            user_display_name: user_display_name.to_string(),
            timestamp: completed_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    fn value(&self, step: Step) -> String {
        escape_html(self.answers.get(step).unwrap_or("-"))
    }
}

/// Whether top-performer notes go out as a separate message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportLayout {
    #[default]
    Split,
    Combined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedReport {
    pub primary: String,
    pub secondary: Option<String>,
}

pub fn format_report(record: &ReportRecord, layout: ReportLayout) -> FormattedReport {
    let user = escape_html(&record.user_display_name);
    let time = escape_html(&record.timestamp);
    let session = record.value(Step::Session);
    let shift = record.value(Step::Shift);

    let mut primary = format!(
        "📊 <b>SHIFT REPORT</b>\n\
         👤 {user}\n\
         📅 {session} | {shift}\n\
         💰 <b>Balance: {balance}</b>\n\
         📋 Checklist: {checklist}\n\
         💬 {comment}\n\
         👥 Fans: {fans}\n",
        balance = record.value(Step::Balance),
        checklist = record.value(Step::Checklist),
        comment = record.value(Step::Comment),
        fans = record.value(Step::Fans),
    );

    let secondary = match layout {
        ReportLayout::Split => Some(format!(
            "🏆 <b>TOPS</b>\n\
             📅 {session} | {shift}\n\
             {tops}\n\
             \n\
             👤 {user} | {time}",
            tops = record.value(Step::Tops),
        )),
        ReportLayout::Combined => {
            primary.push_str(&format!("🏆 Tops: {}\n", record.value(Step::Tops)));
            None
        }
    };
    primary.push_str(&format!("\n⏰ {time}"));

    FormattedReport { primary, secondary }
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
