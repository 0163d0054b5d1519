//! sqlmig Store - SQLite ledger and change-set files
//!
//! Provides:
//! - `SqliteLedger`, the rusqlite implementation of `LedgerStorage`
//! - Bootstrap of the ledger's own schema with checksums
//! - Loading change-sets from `<version>_<name>_{up,down}.sql` files
//! - Creating new empty change-set file pairs

pub mod bootstrap;
pub mod changesets;
pub mod db;
pub mod errors;
pub mod sqlite_ledger;

// Re-export key types
pub use changesets::{create_pair, load_dir, CreatedPair};
pub use errors::Result;
pub use sqlite_ledger::SqliteLedger;
