// Property tests for the ledger state machine over random list lengths,
// failure positions and operation sequences.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use sqlmig_core::reporter::RecordingReporter;
use sqlmig_core::{MemoryLedger, Status};
use sqlmig_engine::Migrator;

const FAIL_MARKER: &str = "-- FAIL";

fn build(
    ledger: MemoryLedger,
    reporter: &RecordingReporter,
    count: u32,
    failing: Option<u32>,
) -> Migrator<'_, MemoryLedger> {
    let mut migrator = Migrator::new(ledger.fail_scripts_containing(FAIL_MARKER), reporter);
    for version in 1..=count {
        let up = if failing == Some(version) {
            format!("-- up {} {}", version, FAIL_MARKER)
        } else {
            format!("-- up {}", version)
        };
        migrator.register(format!("cs_{}", version), up, format!("-- down {}", version));
    }
    migrator.connect().unwrap();
    migrator
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Up,
    Down,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Up), Just(Op::Down), Just(Op::Redo)]
}

proptest! {
    #[test]
    fn up_applies_everything_in_order(count in 0u32..15) {
        let reporter = RecordingReporter::new();
        let mut migrator = build(MemoryLedger::new(), &reporter, count, None);

        let applied = migrator.up().unwrap();

        prop_assert_eq!(applied, (1..=count).collect::<Vec<_>>());
        for version in 1..=count {
            prop_assert_eq!(migrator.storage().status_of(version), Status::Applied);
        }
        prop_assert!(migrator.up().unwrap().is_empty());
    }

    #[test]
    fn failure_splits_the_list_and_resume_retries_it(
        (count, failing) in (1u32..15).prop_flat_map(|n| (Just(n), 1..=n))
    ) {
        let reporter = RecordingReporter::new();
        let mut migrator = build(MemoryLedger::new(), &reporter, count, Some(failing));

        prop_assert!(migrator.up().is_err());
        for version in 1..=count {
            let expected = match version.cmp(&failing) {
                std::cmp::Ordering::Less => Status::Applied,
                std::cmp::Ordering::Equal => Status::Error,
                std::cmp::Ordering::Greater => Status::Pending,
            };
            prop_assert_eq!(migrator.storage().status_of(version), expected);
        }

        migrator.storage_mut().clear_failures();
        let applied = migrator.up().unwrap();
        prop_assert_eq!(applied.first().copied(), Some(failing));
        prop_assert_eq!(applied.len() as u32, count - failing + 1);
    }

    #[test]
    fn down_after_up_reverts_only_the_last(count in 1u32..15) {
        let reporter = RecordingReporter::new();
        let mut migrator = build(MemoryLedger::new(), &reporter, count, None);
        migrator.up().unwrap();

        prop_assert_eq!(migrator.down().unwrap(), count);
        for version in 1..count {
            prop_assert_eq!(migrator.storage().status_of(version), Status::Applied);
        }
        prop_assert_eq!(migrator.storage().status_of(count), Status::Reverted);
    }

    #[test]
    fn redo_after_up_keeps_terminal_state(count in 1u32..15) {
        let reporter = RecordingReporter::new();
        let mut migrator = build(MemoryLedger::new(), &reporter, count, None);
        migrator.up().unwrap();
        let before: Vec<Status> = (1..=count).map(|v| migrator.storage().status_of(v)).collect();

        prop_assert_eq!(migrator.redo().unwrap(), count);

        let after: Vec<Status> = (1..=count).map(|v| migrator.storage().status_of(v)).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn random_operations_keep_the_ledger_consistent(
        count in 1u32..8,
        ops in prop::collection::vec(op_strategy(), 0..25)
    ) {
        let reporter = RecordingReporter::new();
        let mut migrator = build(MemoryLedger::new(), &reporter, count, None);
        // Model: versions 1..=applied are Applied, nothing else is
        let mut applied = 0u32;

        for op in ops {
            match op {
                Op::Up => {
                    migrator.up().unwrap();
                    applied = count;
                }
                Op::Down => {
                    let result = migrator.down();
                    if applied == 0 {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert_eq!(result.unwrap(), applied);
                        applied -= 1;
                    }
                }
                Op::Redo => {
                    let result = migrator.redo();
                    if applied == 0 {
                        prop_assert!(result.is_err());
                    } else {
                        prop_assert_eq!(result.unwrap(), applied);
                    }
                }
            }

            prop_assert_eq!(migrator.db_version().unwrap(), applied);
            for record in migrator.storage().records() {
                prop_assert!(!record.status.is_transient());
                if record.version <= applied {
                    prop_assert_eq!(record.status, Status::Applied);
                } else {
                    prop_assert_eq!(record.status, Status::Reverted);
                }
            }
        }
    }
}
