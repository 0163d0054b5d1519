//! Error helpers for sqlmig-store
//!
//! Builds `MigError`s with store-specific context

use sqlmig_core::errors::{MigError, MigErrorKind};
use sqlmig_core::Status;
use std::path::Path;

/// Result type alias using MigError
pub type Result<T> = std::result::Result<T, MigError>;

/// Wrap a rusqlite error; the driver text is kept verbatim
pub fn from_rusqlite(op: &str, err: rusqlite::Error) -> MigError {
    MigError::new(MigErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message(err.to_string())
}

/// Create an IO error for a filesystem path
pub fn io_error(op: &str, path: &Path, err: std::io::Error) -> MigError {
    MigError::new(MigErrorKind::Io)
        .with_op(op.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// The distinguished "no record with this status" signal
pub fn not_found(status: Status) -> MigError {
    MigError::new(MigErrorKind::NotFound)
        .with_op("select_last_by_status")
        .with_message(format!("no migration with status {}", status))
}

/// Status filter or stored value outside the recognised set
pub fn unexpected_status(op: &str, status: &str) -> MigError {
    MigError::new(MigErrorKind::UnexpectedStatus)
        .with_op(op.to_string())
        .with_message(format!("unexpected status '{}'", status))
}

/// Operation on a ledger that has not been connected
pub fn not_connected(op: &str) -> MigError {
    MigError::new(MigErrorKind::Persistence)
        .with_op(op.to_string())
        .with_message("ledger is not connected")
}

/// Create a bootstrap step error
pub fn bootstrap_error(step_id: &str, reason: &str) -> MigError {
    MigError::new(MigErrorKind::Persistence)
        .with_op("ledger_bootstrap")
        .with_message(format!("Bootstrap step {} failed: {}", step_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(step_id: &str, expected: &str, actual: &str) -> MigError {
    MigError::new(MigErrorKind::Persistence)
        .with_op("ledger_bootstrap_checksum")
        .with_message(format!(
            "Checksum mismatch for bootstrap step {}: expected {}, got {}",
            step_id, expected, actual
        ))
}
