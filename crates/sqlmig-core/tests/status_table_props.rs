// Property tests for the fixed-width status table.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use sqlmig_core::render::render_status_table;
use sqlmig_core::{LedgerRecord, Status};

fn status_strategy() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::PERSISTED.to_vec())
}

fn record_strategy() -> impl Strategy<Value = LedgerRecord> {
    (
        1u32..9_999_999,
        "[a-z][a-z0-9_]{0,40}",
        status_strategy(),
        0i64..4_000_000_000,
    )
        .prop_map(|(version, name, status, secs)| {
            let at = Utc.timestamp_opt(secs, 0).unwrap();
            LedgerRecord::new(version, name, status, at)
        })
}

proptest! {
    #[test]
    fn every_record_gets_one_row(records in prop::collection::vec(record_strategy(), 0..20)) {
        let lines = render_status_table(&records);
        prop_assert_eq!(lines.len(), records.len() + 3);
    }

    #[test]
    fn all_lines_share_one_width(records in prop::collection::vec(record_strategy(), 0..20)) {
        let lines = render_status_table(&records);
        let width = lines[0].len();
        for line in &lines {
            prop_assert_eq!(line.len(), width);
        }
    }

    #[test]
    fn rows_show_status_word(record in record_strategy()) {
        let lines = render_status_table(std::slice::from_ref(&record));
        prop_assert!(lines[2].contains(record.status.as_str()));
    }
}
