//! sqlmig Engine - migration orchestration
//!
//! Drives a locally defined, ordered list of change-sets against a
//! [`LedgerStorage`](sqlmig_core::LedgerStorage): which change-set runs
//! next, in which direction, and how each outcome is recorded.

pub mod commands;
pub mod migrator;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use migrator::{Migrator, MigratorOptions};
