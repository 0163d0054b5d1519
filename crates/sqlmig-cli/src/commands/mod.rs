//! CLI subcommands
//!
//! Every command reports its own failures through a reporter and returns
//! the error for the exit status.

pub mod create;
pub mod inspect;
pub mod migrate;

use sqlmig_core::{MigError, Reporter};
use sqlmig_core_types::Sensitive;
use sqlmig_store::SqliteLedger;

/// Report an error raised outside the migrator, which reports its own
pub(crate) fn reported(reporter: &dyn Reporter, err: MigError) -> MigError {
    reporter.error(&format!("{}: {}", err.kind().describe(), err));
    err
}

pub(crate) fn ledger(conn: String) -> SqliteLedger {
    SqliteLedger::new(Sensitive::new(conn))
}
