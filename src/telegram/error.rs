//! Bot API failures
//!
//! Telegram answers every method with an `ok` flag, an `error_code` that
//! mirrors the HTTP status and a human `description`. Flood control adds
//! `parameters.retry_after`. The kinds below are what the poll loop and the
//! report dispatcher need to tell apart.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// Telegram's `description` when there was one, otherwise the client-side cause
    pub message: String,
    /// Flood-control wait requested by Telegram
    pub retry_after: Option<Duration>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn with_retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    /// Connect failure, or a long poll that outlived the client timeout
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    /// "Too Many Requests: retry after N"
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::ServerError, message)
    }

    /// Token rejected. Telegram serves a malformed `/bot<token>` path as 404.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Auth, message)
    }

    /// "Bad Request: chat not found", "message thread not found", bad markup
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidRequest, message)
    }

    /// `ok: false` on a 200, unparsable bodies, anything unclassified
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unknown, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// No usable response from api.telegram.org (or the configured mirror)
    Network,
    /// 429 flood control; `retry_after` says how long to wait
    RateLimit,
    /// 5xx from the Bot API front end
    ServerError,
    /// 401 bad token, 403 blocked by the user, 404 token path not found
    Auth,
    /// 400: unknown chat or thread, message too long, invalid keyboard
    InvalidRequest,
    Unknown,
}

impl TransportErrorKind {
    /// Whether resending the same call later can succeed. Config mistakes
    /// (wrong token, wrong group or thread id) never heal on their own.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
