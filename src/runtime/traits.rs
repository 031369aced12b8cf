//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::catalog::{CatalogError, SqliteCatalog};
use crate::telegram::TransportError;
use crate::wizard::{Prompt, UserIdentity};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use std::sync::Arc;

pub type ChatId = i64;

/// A fixed delivery target: a group plus an optional forum thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destination {
    pub chat_id: ChatId,
    pub thread_id: Option<i64>,
}

impl Destination {
    pub fn new(chat_id: ChatId, thread_id: Option<i64>) -> Self {
        Self { chat_id, thread_id }
    }
}

/// A text message from a user, stripped of transport detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub user: UserIdentity,
    pub text: String,
}

/// One poll's worth of inbound messages
#[derive(Debug, Default)]
pub struct InboundBatch {
    pub messages: Vec<InboundMessage>,
    /// Offset to pass to the next poll
    pub next_offset: Option<i64>,
}

/// Outbound side of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Show a prompt with its option keyboard
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), TransportError>;

    /// Send a notice to the user, clearing any keyboard
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError>;

    /// Deliver a report to a destination channel
    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
    ) -> Result<(), TransportError>;
}

/// Inbound side of the chat platform
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait for the next batch of messages after `offset`
    async fn poll(&self, offset: Option<i64>) -> Result<InboundBatch, TransportError>;
}

/// Lookup of the work sessions a user may report on
pub trait SessionCatalog: Send + Sync {
    fn role_for(&self, user_id: i64) -> Result<String, CatalogError>;

    fn lookup_sessions(&self, role: &str, date: &str) -> Result<Vec<String>, CatalogError>;
}

/// Wall-clock source
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_prompt(&self, chat_id: ChatId, prompt: &Prompt) -> Result<(), TransportError> {
        (**self).send_prompt(chat_id, prompt).await
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), TransportError> {
        (**self).send_text(chat_id, text).await
    }

    async fn send_message(
        &self,
        destination: &Destination,
        text: &str,
    ) -> Result<(), TransportError> {
        (**self).send_message(destination, text).await
    }
}

#[async_trait]
impl<T: UpdateSource + ?Sized> UpdateSource for Arc<T> {
    async fn poll(&self, offset: Option<i64>) -> Result<InboundBatch, TransportError> {
        (**self).poll(offset).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

impl SessionCatalog for SqliteCatalog {
    fn role_for(&self, user_id: i64) -> Result<String, CatalogError> {
        SqliteCatalog::role_for(self, user_id)
    }

    fn lookup_sessions(&self, role: &str, date: &str) -> Result<Vec<String>, CatalogError> {
        self.sessions_for(role, date)
    }
}

/// Local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
