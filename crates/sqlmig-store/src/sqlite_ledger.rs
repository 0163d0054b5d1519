//! SQLite ledger implementation
//!
//! Persists ledger records to the `schema_migrations` table and runs
//! change-set scripts on the same connection.

use crate::bootstrap::apply_bootstrap;
use crate::db;
use crate::errors::{from_rusqlite, not_connected, not_found, unexpected_status, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};
use sqlmig_core::{LedgerRecord, LedgerStorage, MigError, MigErrorKind, Status};
use sqlmig_core_types::Sensitive;

/// Raw row as stored; converted after the statement completes
type RawRow = (i64, String, String, String);

const SELECT_COLUMNS: &str =
    "SELECT version, name, status, status_changed_at FROM schema_migrations";

/// rusqlite-backed ledger
///
/// The connection string is held redacted so it never reaches logs.
pub struct SqliteLedger {
    conn_string: Sensitive<String>,
    conn: Option<Connection>,
}

impl SqliteLedger {
    /// Ledger for a connection string: a file path, `sqlite://path` or `:memory:`
    pub fn new(conn_string: Sensitive<String>) -> Self {
        Self {
            conn_string,
            conn: None,
        }
    }

    /// Ledger for a database file
    pub fn open_path(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(Sensitive::new(path.as_ref().display().to_string()))
    }

    /// The live connection, if connected
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    fn conn(&self, op: &str) -> Result<&Connection> {
        self.conn.as_ref().ok_or_else(|| not_connected(op))
    }

    fn conn_mut(&mut self, op: &str) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or_else(|| not_connected(op))
    }
}

impl std::fmt::Debug for SqliteLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLedger")
            .field("conn_string", &self.conn_string)
            .field("connected", &self.conn.is_some())
            .finish()
    }
}

impl LedgerStorage for SqliteLedger {
    fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Ok(());
        }
        if self.conn_string.is_blank() {
            return Err(MigError::new(MigErrorKind::Persistence)
                .with_op("connect")
                .with_message("empty connection string"));
        }

        let target = db::resolve_target(self.conn_string.expose());
        let in_memory = target == db::MEMORY_TARGET;
        tracing::debug!(in_memory, "opening ledger");

        let mut conn = db::open(target)?;
        db::configure(&conn)?;
        apply_bootstrap(&mut conn)?;

        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| from_rusqlite("close", e)),
            None => Ok(()),
        }
    }

    fn select_all(&self) -> Result<Vec<LedgerRecord>> {
        let conn = self.conn("select_all")?;

        let mut stmt = conn
            .prepare(&format!("{} ORDER BY version DESC, name", SELECT_COLUMNS))
            .map_err(|e| from_rusqlite("select_all", e))?;

        let rows = stmt
            .query_map([], read_row)
            .map_err(|e| from_rusqlite("select_all", e))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| from_rusqlite("select_all", e))?;

        rows.into_iter().map(into_record).collect()
    }

    fn select_last_by_status(&self, status: Status) -> Result<LedgerRecord> {
        if status == Status::Pending {
            return Err(unexpected_status("select_last_by_status", status.as_str()));
        }
        let conn = self.conn("select_last_by_status")?;

        let row = conn
            .query_row(
                &format!(
                    "{} WHERE status = ?1 ORDER BY version DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                [status.as_str()],
                read_row,
            )
            .optional()
            .map_err(|e| from_rusqlite("select_last_by_status", e))?;

        match row {
            Some(row) => into_record(row),
            None => Err(not_found(status)),
        }
    }

    fn upsert(&mut self, record: &LedgerRecord) -> Result<()> {
        let conn = self.conn_mut("upsert")?;

        conn.execute(
            "INSERT INTO schema_migrations (version, name, status, status_changed_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(version, name) DO UPDATE SET
                status = excluded.status,
                status_changed_at = excluded.status_changed_at",
            rusqlite::params![
                record.version,
                record.name,
                record.status.as_str(),
                format_timestamp(&record.status_changed_at),
            ],
        )
        .map_err(|e| {
            from_rusqlite("upsert", e)
                .with_version(record.version)
                .with_name(record.name.clone())
        })?;

        Ok(())
    }

    fn execute_script(&mut self, sql: &str) -> Result<()> {
        let conn = self.conn_mut("execute_script")?;
        let outcome = conn
            .execute_batch(sql)
            .map_err(|e| from_rusqlite("execute_script", e));

        // Status writes that follow must commit on their own
        if !conn.is_autocommit() {
            tracing::warn!("script left a transaction open, rolling back");
            conn.execute_batch("ROLLBACK")
                .map_err(|e| from_rusqlite("execute_script", e))?;
            outcome?;
            return Err(MigError::new(MigErrorKind::Persistence)
                .with_op("execute_script")
                .with_message("script left a transaction open; it was rolled back"));
        }
        outcome
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn into_record((version, name, status, changed_at): RawRow) -> Result<LedgerRecord> {
    let version = u32::try_from(version).map_err(|_| {
        MigError::new(MigErrorKind::UnexpectedVersion)
            .with_op("read_ledger")
            .with_message(format!("stored version {} is out of range", version))
    })?;

    let status = status
        .parse::<Status>()
        .map_err(|e| e.with_version(version).with_name(name.clone()))?;
    if status == Status::Pending {
        return Err(unexpected_status("read_ledger", status.as_str()));
    }

    let status_changed_at = DateTime::parse_from_rfc3339(&changed_at)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            MigError::new(MigErrorKind::Persistence)
                .with_op("read_ledger")
                .with_message(format!("invalid timestamp '{}': {}", changed_at, e))
                .with_version(version)
        })?;

    Ok(LedgerRecord::new(version, name, status, status_changed_at))
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn memory_ledger() -> SqliteLedger {
        let mut ledger = SqliteLedger::new(Sensitive::new(":memory:".to_string()));
        ledger.connect().unwrap();
        ledger
    }

    #[test]
    fn test_timestamp_survives_storage() {
        let mut ledger = memory_ledger();
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::microseconds(123_456);
        ledger
            .upsert(&LedgerRecord::new(1, "init", Status::Applied, at))
            .unwrap();

        let stored = ledger.select_last_by_status(Status::Applied).unwrap();
        assert_eq!(stored.status_changed_at, at);
    }

    #[test]
    fn test_unknown_stored_status_is_rejected() {
        let ledger = memory_ledger();
        ledger
            .connection()
            .unwrap()
            .execute(
                "INSERT INTO schema_migrations VALUES (1, 'init', 'done', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        let err = ledger.select_all().unwrap_err();
        assert_eq!(err.kind(), MigErrorKind::UnexpectedStatus);
    }

    #[test]
    fn test_debug_redacts_connection_string() {
        let ledger = SqliteLedger::new(Sensitive::new("/secret/path.db".to_string()));
        assert!(!format!("{:?}", ledger).contains("secret"));
    }
}
