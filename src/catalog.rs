//! Session catalog
//!
//! Small SQLite store of user roles and the work sessions available to each
//! role on a given day.

mod schema;

pub use schema::{DATE_FORMAT, DEFAULT_ROLE};
use schema::SCHEMA;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Catalog connection lock poisoned")]
    LockPoisoned,
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A session row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionEntry {
    pub name: String,
    pub role: String,
    pub date: String,
}

/// Thread-safe catalog handle
#[derive(Clone)]
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
    default_role: String,
}

impl SqliteCatalog {
    /// Open or create the catalog at the given path
    pub fn open<P: AsRef<Path>>(path: P, default_role: impl Into<String>) -> CatalogResult<Self> {
        Self::init(Connection::open(path)?, default_role.into())
    }

    /// Open an in-memory catalog (for testing)
    pub fn open_in_memory() -> CatalogResult<Self> {
        Self::init(Connection::open_in_memory()?, DEFAULT_ROLE.to_string())
    }

    fn init(conn: Connection, default_role: String) -> CatalogResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            default_role,
        })
    }

    fn conn(&self) -> CatalogResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    /// Role of a user. Unknown users are registered with the default role.
    pub fn role_for(&self, user_id: i64) -> CatalogResult<String> {
        let conn = self.conn()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT role FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(role) = existing {
            return Ok(role);
        }

        conn.execute(
            "INSERT OR IGNORE INTO users (user_id, role) VALUES (?1, ?2)",
            params![user_id, self.default_role],
        )?;
        tracing::info!(user_id, role = %self.default_role, "Registered user with default role");
        Ok(self.default_role.clone())
    }

    pub fn set_role(&self, user_id: i64, role: &str) -> CatalogResult<()> {
        self.conn()?.execute(
            "INSERT INTO users (user_id, role) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET role = excluded.role",
            params![user_id, role],
        )?;
        Ok(())
    }

    /// Add a session; returns false if it was already present
    pub fn add_session(&self, name: &str, role: &str, date: &str) -> CatalogResult<bool> {
        let inserted = self.conn()?.execute(
            "INSERT OR IGNORE INTO sessions (name, role, date) VALUES (?1, ?2, ?3)",
            params![name, role, date],
        )?;
        Ok(inserted > 0)
    }

    /// Session names for a role on a date, in insertion order
    pub fn sessions_for(&self, role: &str, date: &str) -> CatalogResult<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT name FROM sessions WHERE role = ?1 AND date = ?2 ORDER BY id")?;
        let names = stmt
            .query_map(params![role, date], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Every stored session, optionally narrowed to one date
    pub fn list_sessions(&self, date: Option<&str>) -> CatalogResult<Vec<SessionEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name, role, date FROM sessions
             WHERE ?1 IS NULL OR date = ?1
             ORDER BY date, role, id",
        )?;
        let entries = stmt
            .query_map(params![date], |row| {
                Ok(SessionEntry {
                    name: row.get(0)?,
                    role: row.get(1)?,
                    date: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
