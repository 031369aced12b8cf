//! Catalog schema

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    role TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    role TEXT NOT NULL,
    date TEXT NOT NULL,

    UNIQUE (name, role, date)
);

CREATE INDEX IF NOT EXISTS idx_sessions_role_date ON sessions(role, date);
";

/// Date key format for session lookups (`DD.MM`)
pub const DATE_FORMAT: &str = "%d.%m";

pub const DEFAULT_ROLE: &str = "operator_of";
