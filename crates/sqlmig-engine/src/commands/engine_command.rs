//! Engine-level commands that require a ledger connection.

use crate::migrator::Migrator;
use sqlmig_core::{LedgerRecord, LedgerStorage, Result};

/// One migrator operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    /// Apply every pending change-set
    Up,
    /// Revert the most recently applied change-set
    Down,
    /// Revert and re-apply the most recently applied change-set
    Redo,
    /// List every ledger record
    Status,
    /// Highest applied version
    DbVersion,
}

/// Result of applying an engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommandResult {
    /// Versions applied by `up`, ascending; empty when nothing was pending
    Applied(Vec<u32>),
    Reverted(u32),
    Redone(u32),
    Status(Vec<LedgerRecord>),
    DbVersion(u32),
}

/// Connect, run `cmd`, close.
///
/// `close` runs whenever `connect` succeeded. An operation error takes
/// precedence over a close error.
pub fn apply_engine_command<S: LedgerStorage>(
    cmd: EngineCommand,
    migrator: &mut Migrator<'_, S>,
) -> Result<EngineCommandResult> {
    migrator.connect()?;

    let outcome = match cmd {
        EngineCommand::Up => migrator.up().map(EngineCommandResult::Applied),
        EngineCommand::Down => migrator.down().map(EngineCommandResult::Reverted),
        EngineCommand::Redo => migrator.redo().map(EngineCommandResult::Redone),
        EngineCommand::Status => migrator.status().map(EngineCommandResult::Status),
        EngineCommand::DbVersion => migrator.db_version().map(EngineCommandResult::DbVersion),
    };

    let closed = migrator.close();

    let result = outcome?;
    closed?;
    Ok(result)
}
