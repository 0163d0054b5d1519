// Integration tests for transient statuses left by an earlier crash

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use sqlmig_core::reporter::RecordingReporter;
use sqlmig_core::{LedgerRecord, MemoryLedger, MigErrorKind, Status};
use sqlmig_engine::{Migrator, MigratorOptions};

fn crashed_ledger() -> MemoryLedger {
    MemoryLedger::with_records([
        LedgerRecord::new(1, "init", Status::Applied, Utc::now()),
        LedgerRecord::new(2, "add_table", Status::Applying, Utc::now()),
    ])
}

fn migrator_with(
    ledger: MemoryLedger,
    reporter: &RecordingReporter,
    options: MigratorOptions,
) -> Migrator<'_, MemoryLedger> {
    let mut migrator = Migrator::new(ledger, reporter).with_options(options);
    migrator.register("init", "-- up 1", "-- down 1");
    migrator.register("add_table", "-- up 2", "-- down 2");
    migrator.connect().unwrap();
    migrator
}

#[test]
fn test_up_refuses_interrupted_ledger() {
    let reporter = RecordingReporter::new();
    let mut migrator = migrator_with(crashed_ledger(), &reporter, MigratorOptions::default());

    let err = migrator.up().unwrap_err();

    assert_eq!(err.kind(), MigErrorKind::InterruptedRun);
    assert!(err.message().contains('2'));
    assert!(migrator.storage().executed_scripts().is_empty());
    assert_eq!(migrator.storage().status_of(2), Status::Applying);
}

#[test]
fn test_down_and_redo_refuse_interrupted_ledger() {
    let reporter = RecordingReporter::new();
    let mut migrator = migrator_with(crashed_ledger(), &reporter, MigratorOptions::default());

    assert_eq!(migrator.down().unwrap_err().kind(), MigErrorKind::InterruptedRun);
    assert_eq!(migrator.redo().unwrap_err().kind(), MigErrorKind::InterruptedRun);
    assert_eq!(migrator.storage().status_of(1), Status::Applied);
}

#[test]
fn test_read_operations_ignore_transient_statuses() {
    let reporter = RecordingReporter::new();
    let migrator = migrator_with(crashed_ledger(), &reporter, MigratorOptions::default());

    assert_eq!(migrator.status().unwrap().len(), 2);
    assert_eq!(migrator.db_version().unwrap(), 1);
}

#[test]
fn test_allow_interrupted_proceeds_with_warning() {
    let reporter = RecordingReporter::new();
    let options = MigratorOptions {
        allow_interrupted: true,
    };
    let mut migrator = migrator_with(crashed_ledger(), &reporter, options);

    let applied = migrator.up().unwrap();

    assert_eq!(applied, vec![2]);
    assert_eq!(migrator.storage().status_of(2), Status::Applied);
    assert!(reporter
        .infos()
        .iter()
        .any(|line| line.starts_with("Warning:") && line.contains('2')));
}
