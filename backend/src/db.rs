//! SQLite access: connection opening and idempotent schema creation.
//!
//! Every store operation opens its own connection and drops it when done.

use crate::config::Config;
use crate::error::AppError;
use rusqlite::Connection;

pub fn open(config: &Config) -> Result<Connection, AppError> {
    Connection::open(&config.database_path).map_err(AppError::from)
}

pub fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS uploads (
            record_id   TEXT PRIMARY KEY,
            school_name TEXT NOT NULL,
            school_code TEXT NOT NULL,
            principal   TEXT NOT NULL,
            rows        TEXT NOT NULL,
            param1      TEXT NOT NULL,
            param2      TEXT NOT NULL,
            param3      TEXT NOT NULL,
            param4      TEXT NOT NULL,
            param5      TEXT NOT NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS uploads_capability
            ON uploads (param1, param2, param3, param4, param5);

        CREATE TABLE IF NOT EXISTS onboarding_certificates (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            record_id     TEXT NOT NULL UNIQUE,
            school_name   TEXT NOT NULL,
            lga           TEXT NOT NULL,
            school_code   TEXT NOT NULL,
            js1           INTEGER NOT NULL DEFAULT 0,
            js2           INTEGER NOT NULL DEFAULT 0,
            js3           INTEGER NOT NULL DEFAULT 0,
            ss1           INTEGER NOT NULL DEFAULT 0,
            ss2           INTEGER NOT NULL DEFAULT 0,
            ss3           INTEGER NOT NULL DEFAULT 0,
            total         INTEGER NOT NULL DEFAULT 0,
            teachers      INTEGER NOT NULL DEFAULT 0,
            pdf_path      TEXT,
            our_ref       INTEGER,
            date_of_issue TEXT,
            created_at    TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        ",
    )?;
    Ok(())
}

/// True when `err` is a UNIQUE / PRIMARY KEY violation.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
