use std::collections::BTreeMap;

use crate::errors::{MigError, MigErrorKind, Result};
use crate::ledger::LedgerStorage;
use crate::model::{LedgerRecord, Status};

/// In-memory ledger
///
/// Records live in a BTreeMap keyed by `(version, name)`. Scripts are not
/// interpreted: they are appended to an execution log, and any script
/// containing a configured failure marker fails instead. Single-threaded,
/// like the engine that drives it.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: BTreeMap<(u32, String), LedgerRecord>,
    executed: Vec<String>,
    failure_markers: Vec<String>,
    connected: bool,
    fail_connect: bool,
    fail_close: bool,
    fail_upsert_of: Option<Status>,
    close_count: usize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the ledger, e.g. to simulate a previous run
    pub fn with_records(records: impl IntoIterator<Item = LedgerRecord>) -> Self {
        let mut ledger = Self::new();
        for record in records {
            ledger
                .records
                .insert((record.version, record.name.clone()), record);
        }
        ledger
    }

    /// Any script containing `marker` fails on execution
    pub fn fail_scripts_containing(mut self, marker: impl Into<String>) -> Self {
        self.failure_markers.push(marker.into());
        self
    }

    /// Make `connect` fail
    pub fn fail_on_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Make `close` fail
    pub fn fail_on_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Make any upsert of a record in `status` fail
    pub fn fail_upsert_of(mut self, status: Status) -> Self {
        self.fail_upsert_of = Some(status);
        self
    }

    /// Drop all failure markers (the "operator fixed the script" step)
    pub fn clear_failures(&mut self) {
        self.failure_markers.clear();
        self.fail_upsert_of = None;
    }

    /// Current status of a version; `Pending` when no record exists
    pub fn status_of(&self, version: u32) -> Status {
        self.records
            .values()
            .filter(|r| r.version == version)
            .map(|r| r.status)
            .next()
            .unwrap_or(Status::Pending)
    }

    /// Records in key order (version ascending)
    pub fn records(&self) -> Vec<LedgerRecord> {
        self.records.values().cloned().collect()
    }

    /// Scripts executed successfully, in order
    pub fn executed_scripts(&self) -> &[String] {
        &self.executed
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of successful `close` calls on a connected ledger
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    fn ensure_connected(&self, op: &str) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(MigError::new(MigErrorKind::Persistence)
                .with_op(op)
                .with_message("ledger is not connected"))
        }
    }
}

impl LedgerStorage for MemoryLedger {
    fn connect(&mut self) -> Result<()> {
        if self.fail_connect {
            return Err(MigError::new(MigErrorKind::Persistence)
                .with_op("connect")
                .with_message("connection refused"));
        }
        self.connected = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        if self.fail_close {
            return Err(MigError::new(MigErrorKind::Persistence)
                .with_op("close")
                .with_message("connection reset while closing"));
        }
        self.connected = false;
        self.close_count += 1;
        Ok(())
    }

    fn select_all(&self) -> Result<Vec<LedgerRecord>> {
        self.ensure_connected("select_all")?;
        let mut records = self.records();
        records.sort_by(|a, b| b.version.cmp(&a.version).then(a.name.cmp(&b.name)));
        Ok(records)
    }

    fn select_last_by_status(&self, status: Status) -> Result<LedgerRecord> {
        self.ensure_connected("select_last_by_status")?;
        if status == Status::Pending {
            return Err(MigError::new(MigErrorKind::UnexpectedStatus)
                .with_op("select_last_by_status")
                .with_message("pending is never stored in the ledger"));
        }
        self.records
            .values()
            .filter(|r| r.status == status)
            .max_by_key(|r| r.version)
            .cloned()
            .ok_or_else(|| {
                MigError::new(MigErrorKind::NotFound)
                    .with_op("select_last_by_status")
                    .with_message(format!("no migration with status {}", status))
            })
    }

    fn upsert(&mut self, record: &LedgerRecord) -> Result<()> {
        self.ensure_connected("upsert")?;
        if self.fail_upsert_of == Some(record.status) {
            return Err(MigError::new(MigErrorKind::Persistence)
                .with_op("upsert")
                .with_message(format!("cannot write status {}", record.status)));
        }
        self.records
            .insert((record.version, record.name.clone()), record.clone());
        Ok(())
    }

    fn execute_script(&mut self, sql: &str) -> Result<()> {
        self.ensure_connected("execute_script")?;
        if let Some(marker) = self.failure_markers.iter().find(|m| sql.contains(m.as_str())) {
            return Err(MigError::new(MigErrorKind::Persistence)
                .with_op("execute_script")
                .with_message(format!("syntax error near \"{}\"", marker)));
        }
        self.executed.push(sql.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(sec: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, sec).unwrap()
    }

    fn connected(ledger: MemoryLedger) -> MemoryLedger {
        let mut ledger = ledger;
        ledger.connect().unwrap();
        ledger
    }

    #[test]
    fn test_requires_connection() {
        let ledger = MemoryLedger::new();
        let err = ledger.select_all().unwrap_err();
        assert_eq!(err.kind(), MigErrorKind::Persistence);
    }

    #[test]
    fn test_select_all_is_version_descending() {
        let ledger = connected(MemoryLedger::with_records([
            LedgerRecord::new(1, "init", Status::Applied, at(0)),
            LedgerRecord::new(3, "seed", Status::Reverted, at(2)),
            LedgerRecord::new(2, "add_table", Status::Applied, at(1)),
        ]));

        let versions: Vec<u32> = ledger.select_all().unwrap().iter().map(|r| r.version).collect();
        assert_eq!(versions, vec![3, 2, 1]);
    }

    #[test]
    fn test_select_last_by_status() {
        let ledger = connected(MemoryLedger::with_records([
            LedgerRecord::new(1, "init", Status::Applied, at(0)),
            LedgerRecord::new(2, "add_table", Status::Applied, at(1)),
            LedgerRecord::new(3, "seed", Status::Error, at(2)),
        ]));

        assert_eq!(ledger.select_last_by_status(Status::Applied).unwrap().version, 2);
        assert_eq!(ledger.select_last_by_status(Status::Error).unwrap().version, 3);

        let err = ledger.select_last_by_status(Status::Reverted).unwrap_err();
        assert!(err.is_not_found());

        let err = ledger.select_last_by_status(Status::Pending).unwrap_err();
        assert_eq!(err.kind(), MigErrorKind::UnexpectedStatus);
    }

    #[test]
    fn test_upsert_overwrites_pair() {
        let mut ledger = connected(MemoryLedger::new());
        let applying = LedgerRecord::new(1, "init", Status::Applying, at(0));
        ledger.upsert(&applying).unwrap();
        ledger.upsert(&applying.transition(Status::Applied, at(1))).unwrap();

        let records = ledger.select_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Applied);
        assert_eq!(records[0].status_changed_at, at(1));
    }

    #[test]
    fn test_failure_marker() {
        let mut ledger = connected(MemoryLedger::new().fail_scripts_containing("BROKEN"));
        ledger.execute_script("SELECT 1;").unwrap();
        let err = ledger.execute_script("BROKEN SQL").unwrap_err();
        assert!(err.message().contains("BROKEN"));
        assert_eq!(ledger.executed_scripts(), &["SELECT 1;".to_string()]);

        ledger.clear_failures();
        ledger.execute_script("BROKEN SQL").unwrap();
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut ledger = connected(MemoryLedger::new());
        ledger.close().unwrap();
        ledger.close().unwrap();
        assert_eq!(ledger.close_count(), 1);
        assert!(!ledger.is_connected());
    }
}
