//! Mock implementations for testing
//!
//! These mocks enable runtime testing without real I/O.

use super::traits::*;
use crate::catalog::CatalogError;
use crate::telegram::TransportError;
use crate::wizard::Prompt;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Mock Transport
// ============================================================================

/// Everything the runtime tried to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Prompt { chat_id: ChatId, prompt: Prompt },
    Text { chat_id: ChatId, text: String },
    Message { destination: Destination, text: String },
}

/// Transport that records outbound traffic and can be told to fail
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<Sent>>,
    failing_destinations: Mutex<Vec<Destination>>,
    fail_prompts: Mutex<bool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery to `destination` fail
    pub fn fail_destination(&self, destination: Destination) {
        self.failing_destinations.lock().unwrap().push(destination);
    }

    pub fn fail_prompts(&self) {
        *self.fail_prompts.lock().unwrap() = true;
    }

    pub fn resume_prompts(&self) {
        *self.fail_prompts.lock().unwrap() = false;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Notices sent to a chat, in order
    pub fn texts(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { chat_id: id, text } if id == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Prompts sent to a chat, in order
    pub fn prompts(&self, chat_id: ChatId) -> Vec<Prompt> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Prompt { chat_id: id, prompt } if id == chat_id => Some(prompt),
                _ => None,
            })
            .collect()
    }

    /// Reports delivered to a destination, in order
    pub fn messages(&self, destination: Destination) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { destination: d, text } if d == destination => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), TransportError> {
        if *self.fail_prompts.lock().unwrap() {
            return Err(TransportError::network("mock prompt failure"));
        }
        self.sent.lock().unwrap().push(Sent::Prompt {
            chat_id,
            prompt: prompt.clone(),
        });
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
    ) -> Result<(), TransportError> {
        if self.failing_destinations.lock().unwrap().contains(destination) {
            return Err(TransportError::invalid_request("mock: thread not found"));
        }
        self.sent.lock().unwrap().push(Sent::Message {
            destination: *destination,
            text: text.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// Mock Session Catalog
// ============================================================================

/// In-memory catalog keyed by (role, date)
#[derive(Default)]
pub struct MockCatalog {
    roles: HashMap<i64, String>,
    sessions: HashMap<(String, String), Vec<String>>,
    broken: bool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, user_id: i64, role: &str) -> Self {
        self.roles.insert(user_id, role.to_string());
        self
    }

    pub fn with_sessions(mut self, role: &str, date: &str, names: &[&str]) -> Self {
        self.sessions.insert(
            (role.to_string(), date.to_string()),
            names.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Every lookup fails
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

impl SessionCatalog for MockCatalog {
    fn role_for(&self, user_id: i64) -> Result<String, CatalogError> {
        if self.broken {
            return Err(CatalogError::LockPoisoned);
        }
        Ok(self
            .roles
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| "operator_of".to_string()))
    }

    fn lookup_sessions(&self, role: &str, date: &str) -> Result<Vec<String>, CatalogError> {
        if self.broken {
            return Err(CatalogError::LockPoisoned);
        }
        Ok(self
            .sessions
            .get(&(role.to_string(), date.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// Fixed Clock
// ============================================================================

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ============================================================================
// Scripted Update Source
// ============================================================================

/// Yields queued poll results, then cancels `shutdown` once drained
pub struct ScriptedUpdates {
    batches: Mutex<VecDeque<Result<InboundBatch, TransportError>>>,
    shutdown: CancellationToken,
    /// Offsets the runtime polled with
    pub offsets: Mutex<Vec<Option<i64>>>,
}

impl ScriptedUpdates {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            batches: Mutex::new(VecDeque::new()),
            shutdown,
            offsets: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, batch: Result<InboundBatch, TransportError>) {
        self.batches.lock().unwrap().push_back(batch);
    }
}

#[async_trait]
impl UpdateSource for ScriptedUpdates {
    async fn poll(&self, offset: Option<i64>) -> Result<InboundBatch, TransportError> {
        self.offsets.lock().unwrap().push(offset);
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                self.shutdown.cancel();
                Ok(InboundBatch {
                    messages: vec![],
                    next_offset: offset,
                })
            }
        }
    }
}
