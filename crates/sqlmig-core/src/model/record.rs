//! Persisted ledger records
//!
//! A record is a plain value. Transitions build a new record rather than
//! mutating the stored one; the ledger keeps the current state per
//! `(version, name)` pair.

use crate::model::{ChangeSet, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current ledger state of one change-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub version: u32,
    pub name: String,
    pub status: Status,
    pub status_changed_at: DateTime<Utc>,
}

impl LedgerRecord {
    pub fn new(
        version: u32,
        name: impl Into<String>,
        status: Status,
        status_changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version,
            name: name.into(),
            status,
            status_changed_at,
        }
    }

    /// First record written for a change-set
    pub fn for_change_set(
        change_set: &ChangeSet,
        status: Status,
        status_changed_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            change_set.version,
            change_set.name.clone(),
            status,
            status_changed_at,
        )
    }

    /// Same `(version, name)` pair in a new status
    pub fn transition(&self, status: Status, status_changed_at: DateTime<Utc>) -> Self {
        Self {
            version: self.version,
            name: self.name.clone(),
            status,
            status_changed_at,
        }
    }

    /// Ledger key
    pub fn key(&self) -> (u32, &str) {
        (self.version, &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transition_leaves_source_record_untouched() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 5).unwrap();

        let applying = LedgerRecord::new(2, "add_table", Status::Applying, t0);
        let applied = applying.transition(Status::Applied, t1);

        assert_eq!(applying.status, Status::Applying);
        assert_eq!(applying.status_changed_at, t0);
        assert_eq!(applied.status, Status::Applied);
        assert_eq!(applied.status_changed_at, t1);
        assert_eq!(applied.key(), applying.key());
    }

    #[test]
    fn test_for_change_set() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let cs = ChangeSet::new(7, "seed", "", "");
        let record = LedgerRecord::for_change_set(&cs, Status::Reverting, t0);
        assert_eq!(record.key(), (7, "seed"));
        assert_eq!(record.status, Status::Reverting);
    }
}
