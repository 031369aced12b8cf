//! Bot configuration, read once from the environment at startup

use crate::catalog::DEFAULT_ROLE;
use crate::runtime::{Destination, ReportRouting};
use crate::telegram::DEFAULT_API_URL;
use crate::wizard::step::{DEFAULT_SESSION_NAMES, DEFAULT_SHIFT_WINDOWS};
use crate::wizard::{FlowDefinition, FlowError};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_CATALOG_PATH: &str = "bot.db";
const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("invalid wizard flow: {0}")]
    Flow(#[from] FlowError),
}

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub group_id: i64,
    pub thread_reports: i64,
    /// Present exactly when reports are split
    pub thread_tops: Option<i64>,
    pub dynamic_session_catalog: bool,
    pub session_names: Vec<String>,
    pub shift_windows: Vec<String>,
    pub catalog_path: PathBuf,
    pub default_role: String,
    pub port: u16,
    pub api_url: String,
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("group_id", &self.group_id)
            .field("thread_reports", &self.thread_reports)
            .field("thread_tops", &self.thread_tops)
            .field("dynamic_session_catalog", &self.dynamic_session_catalog)
            .field("session_names", &self.session_names)
            .field("shift_windows", &self.shift_windows)
            .field("catalog_path", &self.catalog_path)
            .field("default_role", &self.default_role)
            .field("port", &self.port)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let split_report = match var("SPLIT_REPORT") {
            Some(raw) => parse_bool("SPLIT_REPORT", &raw)?,
            None => true,
        };
        let thread_tops = if split_report {
            Some(parse("THREAD_TOPS", &required("THREAD_TOPS")?)?)
        } else {
            None
        };
        let dynamic_session_catalog = match var("DYNAMIC_SESSION_CATALOG") {
            Some(raw) => parse_bool("DYNAMIC_SESSION_CATALOG", &raw)?,
            None => false,
        };
        let port = match var("PORT") {
            Some(raw) => parse("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            group_id: parse("GROUP_ID", &required("GROUP_ID")?)?,
            thread_reports: parse("THREAD_REPORTS", &required("THREAD_REPORTS")?)?,
            thread_tops,
            dynamic_session_catalog,
            session_names: list(var("SESSION_NAMES"), DEFAULT_SESSION_NAMES),
            shift_windows: list(var("SHIFT_WINDOWS"), DEFAULT_SHIFT_WINDOWS),
            catalog_path: var("CATALOG_DB_PATH")
                .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string())
                .into(),
            default_role: var("DEFAULT_ROLE").unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            port,
            api_url: var("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    pub fn flow(&self) -> Result<FlowDefinition, ConfigError> {
        let sessions = (!self.dynamic_session_catalog).then(|| self.session_names.clone());
        Ok(FlowDefinition::shift_report(
            sessions,
            self.shift_windows.clone(),
        )?)
    }

    pub fn routing(&self) -> ReportRouting {
        ReportRouting {
            primary: Destination::new(self.group_id, Some(self.thread_reports)),
            secondary: self
                .thread_tops
                .map(|thread| Destination::new(self.group_id, Some(thread))),
        }
    }
}

fn parse<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
        }),
    }
}

fn list(raw: Option<String>, defaults: &[&str]) -> Vec<String> {
    match raw {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect(),
        None => defaults.iter().map(ToString::to_string).collect(),
    }
}
