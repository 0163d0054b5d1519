//! Create command
//!
//! Usage: sqlmig create <NAME> <DIR>

use clap::Args;
use sqlmig_core::{ConsoleReporter, MigError, Reporter};
use std::path::PathBuf;

use super::reported;

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Change-set name (ASCII letters, digits, `_` and `-`)
    pub name: String,

    /// Directory holding the change-set scripts
    pub dir: PathBuf,
}

/// Write `<version>_<name>_up.sql` and `<version>_<name>_down.sql`
pub fn execute(args: CreateArgs) -> Result<(), MigError> {
    let reporter = ConsoleReporter;

    let created =
        sqlmig_store::create_pair(&args.dir, &args.name).map_err(|e| reported(&reporter, e))?;

    reporter.info(&format!("{} created", created.up_path.display()));
    reporter.info(&format!("{} created", created.down_path.display()));
    Ok(())
}
