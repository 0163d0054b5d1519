//! Ledger schema bootstrap
//!
//! The ledger's own tables are versioned independently of the change-sets
//! it records. Provides:
//! - Embedded SQL steps, applied in order on every connect
//! - Checksums to detect edited steps
//! - Idempotent application

mod checksums;
mod embedded;
mod runner;

pub use checksums::compute_checksum;
pub use embedded::{get_steps, BootstrapStep};
pub use runner::{apply_bootstrap, BOOTSTRAP_TABLE};
