//! Up, down and redo commands
//!
//! Usage: sqlmig {up|down|redo} <DIR> [CONN] [--allow-interrupted]

use clap::Args;
use sqlmig_core::{ConsoleReporter, MigError};
use sqlmig_engine::{apply_engine_command, EngineCommand, Migrator, MigratorOptions};
use std::path::PathBuf;

use super::{ledger, reported};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Directory holding the change-set scripts
    pub dir: PathBuf,

    /// Database path, `sqlite://<path>` or `:memory:`
    #[arg(env = "SQLMIG_DATABASE", hide_env_values = true)]
    pub conn: String,

    /// Run even if an earlier run left a change-set applying or reverting
    #[arg(long)]
    pub allow_interrupted: bool,
}

/// Load the scripts in `dir` and run one state-changing command
pub fn execute(args: MigrateArgs, command: EngineCommand) -> Result<(), MigError> {
    let reporter = ConsoleReporter;

    let change_sets = sqlmig_store::load_dir(&args.dir).map_err(|e| reported(&reporter, e))?;

    let options = MigratorOptions {
        allow_interrupted: args.allow_interrupted,
    };
    let mut migrator = Migrator::new(ledger(args.conn), &reporter).with_options(options);
    migrator
        .register_all(change_sets)
        .map_err(|e| reported(&reporter, e))?;

    apply_engine_command(command, &mut migrator)?;
    Ok(())
}
