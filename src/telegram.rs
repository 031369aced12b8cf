//! Telegram transport
//!
//! Long-polls `getUpdates` for inbound text and delivers prompts and reports
//! with `sendMessage`.

mod client;
mod error;
mod types;

pub use client::{to_inbound, TelegramClient, DEFAULT_API_URL, POLL_TIMEOUT_SECS};
pub use error::{TransportError, TransportErrorKind};
pub use types::{Chat, Message, Update, User};
