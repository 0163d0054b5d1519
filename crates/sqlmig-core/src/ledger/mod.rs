//! Ledger storage contract
//!
//! The engine owns all migration semantics; a ledger only stores records
//! and executes scripts. Implementations:
//! - [`MemoryLedger`] in this crate, for tests
//! - `SqliteLedger` in `sqlmig-store`

mod memory;

pub use memory::MemoryLedger;

use crate::errors::Result;
use crate::model::{LedgerRecord, Status};

/// Storage collaborator consumed by the migration engine
///
/// # Errors
///
/// `select_last_by_status` distinguishes "no such record" with
/// [`MigErrorKind::NotFound`](crate::MigErrorKind::NotFound); every other
/// failure is a hard error.
pub trait LedgerStorage {
    /// Acquire the underlying connection and create the ledger table if absent
    fn connect(&mut self) -> Result<()>;

    /// Release the connection; a no-op when not connected
    fn close(&mut self) -> Result<()>;

    /// All records, version descending. An empty ledger yields an empty list.
    fn select_all(&self) -> Result<Vec<LedgerRecord>>;

    /// Highest-version record currently in `status`
    ///
    /// Fails with `NotFound` when no record has that status and with
    /// `UnexpectedStatus` for [`Status::Pending`], which is never stored.
    fn select_last_by_status(&self, status: Status) -> Result<LedgerRecord>;

    /// Insert the record, or overwrite status and timestamp of its `(version, name)` pair
    fn upsert(&mut self, record: &LedgerRecord) -> Result<()>;

    /// Execute an opaque SQL text block verbatim
    fn execute_script(&mut self, sql: &str) -> Result<()>;
}

impl<L: LedgerStorage + ?Sized> LedgerStorage for Box<L> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn select_all(&self) -> Result<Vec<LedgerRecord>> {
        (**self).select_all()
    }

    fn select_last_by_status(&self, status: Status) -> Result<LedgerRecord> {
        (**self).select_last_by_status(status)
    }

    fn upsert(&mut self, record: &LedgerRecord) -> Result<()> {
        (**self).upsert(record)
    }

    fn execute_script(&mut self, sql: &str) -> Result<()> {
        (**self).execute_script(sql)
    }
}
