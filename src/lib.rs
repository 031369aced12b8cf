//! Shift report bot
//!
//! A Telegram bot that walks operators through a fixed sequence of questions
//! about their shift and posts the finished report to a group thread.

pub mod catalog;
pub mod config;
pub mod health;
pub mod report;
pub mod runtime;
pub mod telegram;
pub mod wizard;
