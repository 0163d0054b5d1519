//! Database connection management
//!
//! Resolves connection strings and opens configured SQLite connections

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// Special target for a private in-memory database
pub const MEMORY_TARGET: &str = ":memory:";

/// Strip an optional `sqlite://` or `sqlite:` prefix from a connection string
///
/// ```
/// use sqlmig_store::db::resolve_target;
///
/// assert_eq!(resolve_target("sqlite://data/app.db"), "data/app.db");
/// assert_eq!(resolve_target("sqlite:app.db"), "app.db");
/// assert_eq!(resolve_target("app.db"), "app.db");
/// ```
pub fn resolve_target(conn_string: &str) -> &str {
    let trimmed = conn_string.trim();
    trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed)
}

/// Open a SQLite database for the given (resolved) target
pub fn open(target: &str) -> Result<Connection> {
    let conn = if target == MEMORY_TARGET {
        Connection::open_in_memory()
    } else {
        Connection::open(target)
    };
    conn.map_err(|e| from_rusqlite("open", e))
}

/// Configure a connection with the ledger's settings
pub fn configure(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| from_rusqlite("configure", e))?;

    // WAL keeps readers unblocked while a long script runs; in-memory
    // databases silently stay in "memory" mode.
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| from_rusqlite("configure", e))?;

    Ok(())
}
