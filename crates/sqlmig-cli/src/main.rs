//! sqlmig CLI
//!
//! Command-line interface for applying and reverting SQL change-sets

use clap::{Parser, Subcommand, ValueEnum};
use sqlmig_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "sqlmig")]
#[command(about = "sqlmig - versioned SQL change-sets with a persistent ledger", long_about = None)]
struct Cli {
    /// Diagnostic log format on stderr (default: warnings only)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    /// Human-readable, debug level
    Pretty,
    /// JSON lines, info level
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create an empty up/down script pair
    Create(commands::create::CreateArgs),
    /// Apply every pending change-set
    Up(commands::migrate::MigrateArgs),
    /// Revert the most recently applied change-set
    Down(commands::migrate::MigrateArgs),
    /// Revert and re-apply the most recently applied change-set
    Redo(commands::migrate::MigrateArgs),
    /// Print the ledger
    Status(commands::inspect::StatusArgs),
    /// Print the highest applied version
    #[command(name = "dbversion")]
    DbVersion(commands::inspect::DbVersionArgs),
}

fn main() {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init(match cli.log_format {
        Some(LogFormat::Pretty) => Profile::Development,
        Some(LogFormat::Json) => Profile::Production,
        None => Profile::Quiet,
    });

    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(args),
        Commands::Up(args) => commands::migrate::execute(args, sqlmig_engine::EngineCommand::Up),
        Commands::Down(args) => {
            commands::migrate::execute(args, sqlmig_engine::EngineCommand::Down)
        }
        Commands::Redo(args) => {
            commands::migrate::execute(args, sqlmig_engine::EngineCommand::Redo)
        }
        Commands::Status(args) => commands::inspect::execute_status(args),
        Commands::DbVersion(args) => commands::inspect::execute_db_version(args),
    };

    // Failures have already been reported on stderr
    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        std::process::exit(1);
    }
}
