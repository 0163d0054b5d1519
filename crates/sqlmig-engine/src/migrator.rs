//! Migration engine
//!
//! ## State machine (per change-set)
//! - `up`:   Pending/Reverted/Error -> Applying -> Applied | Error
//! - `down`: Applied -> Reverting -> Reverted | Error
//!
//! Every transient write is followed by a terminal write before the
//! operation returns. Status writes and script execution are separate
//! storage calls; nothing wraps them in a transaction.

use std::time::Instant;

use chrono::Utc;
use sqlmig_core::errors::{MigError, MigErrorKind, Result};
use sqlmig_core::render::render_status_table;
use sqlmig_core::schema::{
    OP_CLOSE, OP_CONNECT, OP_DB_VERSION, OP_DOWN, OP_REDO, OP_STATUS, OP_UP,
};
use sqlmig_core::{
    log_op_end, log_op_error, log_op_start, ChangeSet, Direction, LedgerRecord, LedgerStorage,
    Reporter, Status,
};
use sqlmig_core_types::RunId;

/// Behaviour switches for a migrator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigratorOptions {
    /// Proceed (with a warning) when a previous run left a transient status
    pub allow_interrupted: bool,
}

/// Drives registered change-sets against a ledger
///
/// One migrator serves one invocation: register the change-sets, connect,
/// run one operation, close. Human-facing lines go to the reporter;
/// structured diagnostics go to `tracing`, tagged with the run id.
pub struct Migrator<'r, S: LedgerStorage> {
    storage: S,
    reporter: &'r dyn Reporter,
    change_sets: Vec<ChangeSet>,
    options: MigratorOptions,
    run_id: RunId,
}

impl<'r, S: LedgerStorage> Migrator<'r, S> {
    pub fn new(storage: S, reporter: &'r dyn Reporter) -> Self {
        Self {
            storage,
            reporter,
            change_sets: Vec::new(),
            options: MigratorOptions::default(),
            run_id: RunId::new(),
        }
    }

    pub fn with_options(mut self, options: MigratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a change-set; its version is its registration position
    pub fn register(
        &mut self,
        name: impl Into<String>,
        up_script: impl Into<String>,
        down_script: impl Into<String>,
    ) -> u32 {
        let version = self.next_version();
        self.change_sets
            .push(ChangeSet::new(version, name, up_script, down_script));
        version
    }

    /// Register loaded change-sets in order
    ///
    /// # Errors
    ///
    /// `InvalidChangeSet` if a change-set's version is not its registration
    /// position; nothing after it is registered.
    pub fn register_all(
        &mut self,
        change_sets: impl IntoIterator<Item = ChangeSet>,
    ) -> Result<()> {
        for change_set in change_sets {
            let expected = self.next_version();
            if change_set.version != expected {
                return Err(MigError::new(MigErrorKind::InvalidChangeSet)
                    .with_op("register")
                    .with_version(change_set.version)
                    .with_name(change_set.name)
                    .with_message(format!(
                        "change-set registered at position {} carries version {}",
                        expected, change_set.version
                    )));
            }
            self.change_sets.push(change_set);
        }
        Ok(())
    }

    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.change_sets
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn options(&self) -> MigratorOptions {
        self.options
    }

    // ---------------------------------------------------------------------
    // Connection scope
    // ---------------------------------------------------------------------

    /// # Errors
    ///
    /// `Connect`, with the storage failure as source.
    pub fn connect(&mut self) -> Result<()> {
        let started = Instant::now();
        log_op_start!(OP_CONNECT, run_id = %self.run_id);
        self.reporter.info("Db connect");

        match self.storage.connect() {
            Ok(()) => {
                log_op_end!(OP_CONNECT, duration_ms = elapsed_ms(started), run_id = %self.run_id);
                Ok(())
            }
            Err(err) => Err(self.fail(OP_CONNECT, MigErrorKind::Connect, err, started)),
        }
    }

    /// # Errors
    ///
    /// `Close`, with the storage failure as source.
    pub fn close(&mut self) -> Result<()> {
        let started = Instant::now();
        log_op_start!(OP_CLOSE, run_id = %self.run_id);
        self.reporter.info("Db close");

        match self.storage.close() {
            Ok(()) => {
                log_op_end!(OP_CLOSE, duration_ms = elapsed_ms(started), run_id = %self.run_id);
                Ok(())
            }
            Err(err) => Err(self.fail(OP_CLOSE, MigErrorKind::Close, err, started)),
        }
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Apply every change-set after the last applied one, in order
    ///
    /// Stops at the first failure; that change-set is left in `Error` and
    /// is the first one retried by the next `up`.
    ///
    /// # Errors
    ///
    /// `Apply` wrapping the cause, or `UnexpectedVersion`/`InterruptedRun`
    /// as-is.
    pub fn up(&mut self) -> Result<Vec<u32>> {
        let started = Instant::now();
        log_op_start!(OP_UP, run_id = %self.run_id, local_count = self.change_sets.len());
        self.reporter.info("Up migrations start");

        match self.up_inner() {
            Ok(applied) => {
                self.reporter.info("Up migrations end");
                log_op_end!(
                    OP_UP,
                    duration_ms = elapsed_ms(started),
                    run_id = %self.run_id,
                    applied_count = applied.len()
                );
                Ok(applied)
            }
            Err(err) => Err(self.fail(OP_UP, MigErrorKind::Apply, err, started)),
        }
    }

    /// Revert the most recently applied change-set, and only that one
    ///
    /// # Errors
    ///
    /// `Revert` wrapping the cause (including `NotFound` when nothing is
    /// applied), or `UnexpectedVersion`/`InterruptedRun` as-is.
    pub fn down(&mut self) -> Result<u32> {
        let started = Instant::now();
        log_op_start!(OP_DOWN, run_id = %self.run_id);
        self.reporter.info("Down migration start");

        match self.down_inner() {
            Ok(version) => {
                self.reporter.info("Down migration end");
                log_op_end!(
                    OP_DOWN,
                    duration_ms = elapsed_ms(started),
                    run_id = %self.run_id,
                    version = version
                );
                Ok(version)
            }
            Err(err) => Err(self.fail(OP_DOWN, MigErrorKind::Revert, err, started)),
        }
    }

    /// Revert the most recently applied change-set, then apply it again
    ///
    /// # Errors
    ///
    /// `Redo` wrapping the cause. A failed revert aborts before anything
    /// is applied.
    pub fn redo(&mut self) -> Result<u32> {
        let started = Instant::now();
        log_op_start!(OP_REDO, run_id = %self.run_id);
        self.reporter.info("Redo migration start");

        match self.redo_inner() {
            Ok(version) => {
                self.reporter.info("Redo migration end");
                log_op_end!(
                    OP_REDO,
                    duration_ms = elapsed_ms(started),
                    run_id = %self.run_id,
                    version = version
                );
                Ok(version)
            }
            Err(err) => Err(self.fail(OP_REDO, MigErrorKind::Redo, err, started)),
        }
    }

    /// Every ledger record, version descending, also reported as a table
    ///
    /// # Errors
    ///
    /// `StatusQuery` wrapping the storage failure.
    pub fn status(&self) -> Result<Vec<LedgerRecord>> {
        let started = Instant::now();
        log_op_start!(OP_STATUS, run_id = %self.run_id);

        match self.storage.select_all() {
            Ok(records) => {
                for line in render_status_table(&records) {
                    self.reporter.info(&line);
                }
                log_op_end!(
                    OP_STATUS,
                    duration_ms = elapsed_ms(started),
                    run_id = %self.run_id,
                    applied_count = records.len()
                );
                Ok(records)
            }
            Err(err) => Err(self.fail(OP_STATUS, MigErrorKind::StatusQuery, err, started)),
        }
    }

    /// Highest applied version; 0 when nothing is applied
    ///
    /// # Errors
    ///
    /// `VersionQuery` wrapping any storage failure other than `NotFound`.
    pub fn db_version(&self) -> Result<u32> {
        let started = Instant::now();
        log_op_start!(OP_DB_VERSION, run_id = %self.run_id);

        match self.last_applied_version() {
            Ok(version) => {
                self.reporter.info(&format!("Version: {}", version));
                log_op_end!(
                    OP_DB_VERSION,
                    duration_ms = elapsed_ms(started),
                    run_id = %self.run_id,
                    version = version
                );
                Ok(version)
            }
            Err(err) => Err(self.fail(OP_DB_VERSION, MigErrorKind::VersionQuery, err, started)),
        }
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn up_inner(&mut self) -> Result<Vec<u32>> {
        self.check_interrupted(OP_UP)?;

        let last_applied = self.last_applied_version()?;
        self.guard_version(last_applied)?;

        let mut applied = Vec::new();
        for change_set in self.change_sets.iter().skip(last_applied as usize) {
            run_transition(&mut self.storage, change_set, Direction::Up)?;
            applied.push(change_set.version);
        }
        Ok(applied)
    }

    fn down_inner(&mut self) -> Result<u32> {
        self.check_interrupted(OP_DOWN)?;

        let last = self.storage.select_last_by_status(Status::Applied)?;
        self.guard_version(last.version)?;

        let change_set = local(&self.change_sets, last.version)?;
        run_transition(&mut self.storage, change_set, Direction::Down)?;
        Ok(last.version)
    }

    fn redo_inner(&mut self) -> Result<u32> {
        let reverted = self.down_inner()?;

        let last_applied = self.last_applied_version()?;
        self.guard_version(last_applied)?;

        if last_applied.saturating_add(1) != reverted {
            tracing::warn!(
                run_id = %self.run_id,
                version = reverted,
                last_applied,
                "re-applying a change-set below other applied versions"
            );
        }

        let change_set = local(&self.change_sets, reverted)?;
        run_transition(&mut self.storage, change_set, Direction::Up)?;
        Ok(reverted)
    }

    fn next_version(&self) -> u32 {
        u32::try_from(self.change_sets.len())
            .map(|n| n.saturating_add(1))
            .unwrap_or(u32::MAX)
    }

    /// Version of the newest `Applied` record, 0 when there is none
    fn last_applied_version(&self) -> Result<u32> {
        match self.storage.select_last_by_status(Status::Applied) {
            Ok(record) => Ok(record.version),
            Err(err) if err.is_not_found() => Ok(0),
            Err(err) => Err(err),
        }
    }

    /// The ledger may not reference versions beyond the local list
    fn guard_version(&self, last_applied: u32) -> Result<()> {
        if last_applied.saturating_sub(1) as usize > self.change_sets.len() {
            return Err(unexpected_version(last_applied, self.change_sets.len()));
        }
        Ok(())
    }

    /// Refuse to run over a transient status left by an earlier crash
    fn check_interrupted(&self, op: &str) -> Result<()> {
        let interrupted: Vec<u32> = self
            .storage
            .select_all()?
            .into_iter()
            .filter(|record| record.status.is_transient())
            .map(|record| record.version)
            .collect();

        if interrupted.is_empty() {
            return Ok(());
        }

        let listed = interrupted
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        if self.options.allow_interrupted {
            tracing::warn!(
                run_id = %self.run_id,
                op,
                versions = %listed,
                "continuing over interrupted run"
            );
            self.reporter.info(&format!(
                "Warning: migration(s) {} left in a transient status by an earlier run",
                listed
            ));
            return Ok(());
        }

        Err(MigError::new(MigErrorKind::InterruptedRun)
            .with_op(op)
            .with_message(format!(
                "migration(s) {} left in a transient status by an earlier run",
                listed
            )))
    }

    /// Classify, log and report a failed operation
    fn fail(&self, op: &str, kind: MigErrorKind, cause: MigError, started: Instant) -> MigError {
        let err = match cause.kind() {
            MigErrorKind::UnexpectedVersion | MigErrorKind::InterruptedRun => cause,
            _ => MigError::new(kind).with_op(op).with_source(cause),
        }
        .with_run_id(self.run_id.clone());

        log_op_error!(op, err, duration_ms = elapsed_ms(started), run_id = %self.run_id);

        let detail = match err.source_error() {
            Some(source) => source.to_string(),
            None => err.to_string(),
        };
        self.reporter
            .error(&format!("{}: {}", err.kind().describe(), detail));

        err
    }
}

/// One attempt to move a change-set in `direction`
///
/// A failed script leaves the change-set in `Error`; if that write fails
/// too, the write failure is returned and the script failure is only
/// logged.
fn run_transition<S: LedgerStorage>(
    storage: &mut S,
    change_set: &ChangeSet,
    direction: Direction,
) -> Result<()> {
    let in_flight =
        LedgerRecord::for_change_set(change_set, direction.in_flight_status(), Utc::now());
    storage.upsert(&in_flight)?;

    if let Err(script_err) = storage.execute_script(change_set.script(direction)) {
        let script_err = script_err
            .with_version(change_set.version)
            .with_name(change_set.name.clone());

        tracing::warn!(
            version = change_set.version,
            change_set = %change_set.name,
            direction = direction.as_str(),
            error = %script_err,
            "change-set script failed"
        );

        storage.upsert(&in_flight.transition(Status::Error, Utc::now()))?;
        return Err(script_err);
    }

    storage.upsert(&in_flight.transition(direction.done_status(), Utc::now()))?;

    tracing::debug!(
        version = change_set.version,
        change_set = %change_set.name,
        status = direction.done_status().as_str(),
        "change-set transition complete"
    );
    Ok(())
}

/// Local change-set for a ledger version
fn local(change_sets: &[ChangeSet], version: u32) -> Result<&ChangeSet> {
    version
        .checked_sub(1)
        .and_then(|index| change_sets.get(index as usize))
        .ok_or_else(|| unexpected_version(version, change_sets.len()))
}

fn unexpected_version(version: u32, local_count: usize) -> MigError {
    MigError::new(MigErrorKind::UnexpectedVersion)
        .with_version(version)
        .with_message(format!(
            "ledger references version {} but only {} change-set(s) are defined",
            version, local_count
        ))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
