//! Change-set files on disk
//!
//! Provides:
//! - File name parsing for `<version>_<name>_{up,down}.sql`
//! - Directory loading with pairing and contiguity checks
//! - Creation of new empty up/down pairs

pub mod create;
pub mod scan;

pub use create::{create_pair, validate_name, CreatedPair};
pub use scan::{load_dir, parse_file_name, ScriptFile};

/// Suffix of forward scripts
pub const UP_SUFFIX: &str = "_up.sql";
/// Suffix of backward scripts
pub const DOWN_SUFFIX: &str = "_down.sql";

/// File name of one half of a change-set pair
pub fn script_file_name(version: u32, name: &str, suffix: &str) -> String {
    format!("{:05}_{}{}", version, name, suffix)
}

/// Leading run of ASCII digits, parsed; `None` when the name has none
pub(crate) fn digit_prefix(file_name: &str) -> Option<u64> {
    let end = file_name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(file_name.len());
    if end == 0 {
        return None;
    }
    file_name[..end].parse().ok()
}
