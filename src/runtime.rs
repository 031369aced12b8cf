//! Runtime: drives the wizard from the transport
//!
//! Owns the controller and the transport handle. Inbound messages are handled
//! strictly one at a time, which is what lets the controller own its session
//! map without locks.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::catalog::DATE_FORMAT;
use crate::report::{format_report, ReportLayout, ReportRecord};
use crate::telegram::{TransportError, TransportErrorKind};
use crate::wizard::{Action, Controller, Event, InputKind, Prompt, RejectReason, UserIdentity};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const NOT_STARTED_TEXT: &str = "Use /start to begin a new shift report.";
pub const NO_SESSIONS_TEXT: &str = "❌ No sessions available for your role today.";
pub const INVALID_OPTION_TEXT: &str = "⚠️ Please choose one of the options below.";
pub const CANCELLED_TEXT: &str = "❌ Report cancelled.\n\nStart a new one: /start";
pub const REPORT_SENT_TEXT: &str = "✅ <b>Report sent!</b>\n\nStart a new one: /start";
pub const REPORT_FAILED_TEXT: &str = "⚠️ Could not send the report. Please start again: /start";
pub const REPORT_PARTIAL_TEXT: &str =
    "⚠️ Report posted, but the tops section could not be sent.\n\nStart a new one: /start";
pub const PROMPT_FAILED_TEXT: &str =
    "⚠️ Could not send the next question. Please send your last answer again.";
pub const CATALOG_FAILED_TEXT: &str = "⚠️ Could not load sessions. Please try again later.";

/// Back-off after a failed poll when the server gave no hint
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);
/// Back-off when polling fails for a reason retrying won't fix soon
const POLL_FATAL_DELAY: Duration = Duration::from_secs(30);

/// Where finished reports go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRouting {
    pub primary: Destination,
    /// Destination for top-performer notes; `None` folds them into the primary report
    pub secondary: Option<Destination>,
}

impl ReportRouting {
    pub fn layout(&self) -> ReportLayout {
        if self.secondary.is_some() {
            ReportLayout::Split
        } else {
            ReportLayout::Combined
        }
    }
}

pub struct WizardRuntime<T, K>
where
    T: Transport + 'static,
    K: Clock,
{
    controller: Controller,
    transport: Arc<T>,
    catalog: Option<Arc<dyn SessionCatalog>>,
    clock: K,
    routing: ReportRouting,
}

impl<T, K> WizardRuntime<T, K>
where
    T: Transport + 'static,
    K: Clock,
{
    pub fn new(controller: Controller, transport: Arc<T>, clock: K, routing: ReportRouting) -> Self {
        Self {
            controller,
            transport,
            catalog: None,
            clock,
            routing,
        }
    }

    /// Resolve session menus through `catalog` when the flow asks for it
    pub fn with_catalog(mut self, catalog: Arc<dyn SessionCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Poll for messages until `shutdown` fires
    pub async fn run<U: UpdateSource>(mut self, updates: U, shutdown: CancellationToken) {
        tracing::info!("Starting wizard runtime");
        let mut offset = None;

        loop {
            let polled = tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                result = updates.poll(offset) => result,
            };

            match polled {
                Ok(batch) => {
                    offset = batch.next_offset;
                    for message in batch.messages {
                        self.handle_message(message).await;
                    }
                }
                Err(e) => {
                    let delay = poll_backoff(&e);
                    if e.kind.is_retryable() {
                        tracing::warn!(error = %e, delay_ms = %delay.as_millis(), "Polling failed");
                    } else {
                        tracing::error!(error = %e, delay_ms = %delay.as_millis(), "Polling failed");
                    }
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        tracing::info!(
            active_sessions = self.controller.active_sessions(),
            "Wizard runtime stopped"
        );
    }

    /// Handle one inbound message end to end
    pub async fn handle_message(&mut self, message: InboundMessage) {
        let InboundMessage { chat_id, user, text } = message;

        let event = match self.controller.flow().classify(&text) {
            InputKind::Start => match self.start_event(&user) {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!(user_id = user.user_id, error = %e, "Session catalog lookup failed");
                    self.notify(chat_id, CATALOG_FAILED_TEXT).await;
                    return;
                }
            },
            InputKind::Cancel => Event::Cancel,
            InputKind::Answer => Event::Answer { text },
        };

        let previous = self.controller.session(user.user_id).cloned();
        let action = self
            .controller
            .handle_input(&user, event, self.clock.now());
        let delivered = self.apply(chat_id, &user, action).await;
        if !delivered {
            // The user never saw the next question, so the answer is not taken
            self.controller.restore(user.user_id, previous);
        }
    }

    fn start_event(&self, user: &UserIdentity) -> Result<Event, crate::catalog::CatalogError> {
        if !self.controller.flow().uses_session_catalog() {
            return Ok(Event::start());
        }
        let Some(catalog) = &self.catalog else {
            tracing::warn!("Flow expects a session catalog but none is configured");
            return Ok(Event::Start {
                session_options: vec![],
                role: None,
            });
        };

        let role = catalog.role_for(user.user_id)?;
        let date = self.clock.now().format(DATE_FORMAT).to_string();
        let session_options = catalog.lookup_sessions(&role, &date)?;
        tracing::debug!(
            user_id = user.user_id,
            role = %role,
            date = %date,
            count = session_options.len(),
            "Resolved session menu"
        );
        Ok(Event::Start {
            session_options,
            role: Some(role),
        })
    }

    /// Perform the action; false when a prompt could not be delivered
    async fn apply(&self, chat_id: ChatId, user: &UserIdentity, action: Action) -> bool {
        match action {
            Action::ShowPrompt(prompt) => self.deliver_prompt(chat_id, &prompt).await,
            Action::Cancelled => {
                tracing::info!(user_id = user.user_id, "Report cancelled");
                self.notify(chat_id, CANCELLED_TEXT).await;
                true
            }
            Action::Rejected { reason, reprompt } => {
                tracing::debug!(user_id = user.user_id, reason = %reason, "Input rejected");
                let notice = match reason {
                    RejectReason::NotStarted => NOT_STARTED_TEXT,
                    RejectReason::InvalidOption => INVALID_OPTION_TEXT,
                    RejectReason::NoSessionsAvailable => NO_SESSIONS_TEXT,
                };
                self.notify(chat_id, notice).await;
                match reprompt {
                    Some(prompt) => self.deliver_prompt(chat_id, &prompt).await,
                    None => true,
                }
            }
            Action::ReportReady(record) => {
                self.dispatch_report(chat_id, user, &record).await;
                true
            }
        }
    }

    async fn deliver_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> bool {
        match self.transport.send_prompt(chat_id, prompt).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "Failed to deliver prompt");
                self.notify(chat_id, PROMPT_FAILED_TEXT).await;
                false
            }
        }
    }

    /// Single best-effort delivery of a finished report
    async fn dispatch_report(&self, chat_id: ChatId, user: &UserIdentity, record: &ReportRecord) {
        let report = format_report(record, self.routing.layout());

        if let Err(e) = self
            .transport
            .send_message(&self.routing.primary, &report.primary)
            .await
        {
            tracing::error!(user_id = user.user_id, error = %e, "Failed to dispatch report");
            self.notify(chat_id, REPORT_FAILED_TEXT).await;
            return;
        }

        if let (Some(text), Some(destination)) = (&report.secondary, &self.routing.secondary) {
            if let Err(e) = self.transport.send_message(destination, text).await {
                // Primary is already posted; starting over would duplicate it
                tracing::error!(user_id = user.user_id, error = %e, "Failed to dispatch tops section");
                self.notify(chat_id, REPORT_PARTIAL_TEXT).await;
                return;
            }
        }

        tracing::info!(user_id = user.user_id, timestamp = %record.timestamp, "Report dispatched");
        self.notify(chat_id, REPORT_SENT_TEXT).await;
    }

    async fn notify(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.transport.send_text(chat_id, text).await {
            tracing::warn!(chat_id, error = %e, "Failed to send notice");
        }
    }
}

fn poll_backoff(error: &TransportError) -> Duration {
    match (error.retry_after, error.kind) {
        (Some(delay), _) => delay,
        (None, TransportErrorKind::Auth | TransportErrorKind::InvalidRequest) => POLL_FATAL_DELAY,
        (None, _) => POLL_RETRY_DELAY,
    }
}
