//! Status and dbversion commands
//!
//! Usage: sqlmig status [CONN] [--json]
//!        sqlmig dbversion [CONN]

use clap::Args;
use sqlmig_core::reporter::ErrorsOnly;
use sqlmig_core::{ConsoleReporter, MigError, MigErrorKind};
use sqlmig_engine::{apply_engine_command, EngineCommand, EngineCommandResult, Migrator};

use super::{ledger, reported};

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Database path, `sqlite://<path>` or `:memory:`
    #[arg(env = "SQLMIG_DATABASE", hide_env_values = true)]
    pub conn: String,

    /// Print the records as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct DbVersionArgs {
    /// Database path, `sqlite://<path>` or `:memory:`
    #[arg(env = "SQLMIG_DATABASE", hide_env_values = true)]
    pub conn: String,
}

/// Print every ledger record
pub fn execute_status(args: StatusArgs) -> Result<(), MigError> {
    if !args.json {
        let reporter = ConsoleReporter;
        let mut migrator = Migrator::new(ledger(args.conn), &reporter);
        apply_engine_command(EngineCommand::Status, &mut migrator)?;
        return Ok(());
    }

    // stdout carries only the JSON document
    let reporter = ErrorsOnly(ConsoleReporter);
    let mut migrator = Migrator::new(ledger(args.conn), &reporter);

    if let EngineCommandResult::Status(records) =
        apply_engine_command(EngineCommand::Status, &mut migrator)?
    {
        let json = serde_json::to_string_pretty(&records).map_err(|e| {
            reported(
                &reporter,
                MigError::new(MigErrorKind::Internal)
                    .with_op("status_json")
                    .with_message(e.to_string()),
            )
        })?;
        println!("{}", json);
    }
    Ok(())
}

/// Print `Version: N`
pub fn execute_db_version(args: DbVersionArgs) -> Result<(), MigError> {
    let reporter = ConsoleReporter;
    let mut migrator = Migrator::new(ledger(args.conn), &reporter);
    apply_engine_command(EngineCommand::DbVersion, &mut migrator)?;
    Ok(())
}
