//! Bootstrap runner
//!
//! Applies bootstrap steps with checksums and idempotency

use crate::bootstrap::checksums::compute_checksum;
use crate::bootstrap::embedded::{get_steps, BootstrapStep};
use crate::errors::{bootstrap_error, checksum_mismatch, from_rusqlite, Result};
use rusqlite::{Connection, OptionalExtension};

/// Table recording which bootstrap steps have run
pub const BOOTSTRAP_TABLE: &str = "sqlmig_schema_version";

/// Bring the ledger schema up to date
pub fn apply_bootstrap(conn: &mut Connection) -> Result<()> {
    create_bootstrap_table(conn)?;

    for step in get_steps() {
        apply_step(conn, &step)?;
    }

    Ok(())
}

fn create_bootstrap_table(conn: &Connection) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                step_id TEXT NOT NULL UNIQUE,
                applied_at INTEGER NOT NULL,
                checksum TEXT NOT NULL
            )",
            BOOTSTRAP_TABLE
        ),
        [],
    )
    .map_err(|e| from_rusqlite("ledger_bootstrap", e))?;

    Ok(())
}

/// Apply a single step unless already recorded
fn apply_step(conn: &mut Connection, step: &BootstrapStep) -> Result<()> {
    let checksum = compute_checksum(step.sql);

    let recorded: Option<String> = conn
        .query_row(
            &format!("SELECT checksum FROM {} WHERE step_id = ?1", BOOTSTRAP_TABLE),
            [step.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| from_rusqlite("ledger_bootstrap", e))?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(checksum_mismatch(step.id, &recorded, &checksum));
        }
        return Ok(());
    }

    tracing::debug!(step_id = step.id, "applying ledger bootstrap step");

    let tx = conn
        .transaction()
        .map_err(|e| from_rusqlite("ledger_bootstrap", e))?;

    tx.execute_batch(step.sql)
        .map_err(|e| bootstrap_error(step.id, &e.to_string()))?;

    tx.execute(
        &format!(
            "INSERT INTO {} (step_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
            BOOTSTRAP_TABLE
        ),
        rusqlite::params![step.id, chrono::Utc::now().timestamp(), checksum],
    )
    .map_err(|e| from_rusqlite("ledger_bootstrap", e))?;

    tx.commit()
        .map_err(|e| from_rusqlite("ledger_bootstrap", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_bootstrap() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(apply_bootstrap(&mut conn).is_ok());
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_bootstrap(&mut conn).unwrap();
        assert!(apply_bootstrap(&mut conn).is_ok());
    }
}
