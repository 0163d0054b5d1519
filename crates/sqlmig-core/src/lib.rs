//! sqlmig Core - change-set model, ledger contract and shared facilities
//!
//! This crate provides the pieces every other sqlmig crate builds on:
//! - ChangeSet / LedgerRecord / Status value types
//! - The `LedgerStorage` contract and an in-memory implementation
//! - The structured error facility (`MigError`, `MigErrorKind`)
//! - The `Reporter` capability used for human-facing progress output
//! - Status table rendering
//! - The structured logging facility (init, macros, test capture)

pub mod errors;
pub mod ledger;
pub mod logging_facility;
pub mod model;
pub mod render;
pub mod reporter;

// Logging macros resolve event names through this path.
pub use sqlmig_core_types::schema;

// Re-export commonly used types
pub use errors::{ChangeSetError, MigError, MigErrorKind, Result};
pub use ledger::{LedgerStorage, MemoryLedger};
pub use model::{ChangeSet, Direction, LedgerRecord, Status};
pub use reporter::{ConsoleReporter, Reporter};
