//! Creating new change-set file pairs

use crate::changesets::{digit_prefix, script_file_name, DOWN_SUFFIX, UP_SUFFIX};
use crate::errors::{io_error, Result};
use sqlmig_core::{ChangeSetError, MigError, MigErrorKind};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Result of `create_pair`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPair {
    pub version: u32,
    pub up_path: PathBuf,
    pub down_path: PathBuf,
}

/// Names end up in file names: ASCII alphanumerics, `_` and `-` only
pub fn validate_name(name: &str) -> std::result::Result<(), ChangeSetError> {
    let invalid = |reason: &str| ChangeSetError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(invalid(&format!("character '{}' is not allowed", c)));
    }
    Ok(())
}

/// Write an empty up/down pair for the next free version in `dir`
///
/// The directory is created if missing. Existing files are never
/// overwritten.
pub fn create_pair(dir: impl AsRef<Path>, name: &str) -> Result<CreatedPair> {
    let dir = dir.as_ref();
    validate_name(name)?;

    fs::create_dir_all(dir).map_err(|e| io_error("create_change_set", dir, e))?;
    let version = next_version(dir)?;

    let up_path = dir.join(script_file_name(version, name, UP_SUFFIX));
    let down_path = dir.join(script_file_name(version, name, DOWN_SUFFIX));

    write_pair(&up_path, &down_path)?;
    tracing::info!(version, name, "created change-set files");
    Ok(CreatedPair {
        version,
        up_path,
        down_path,
    })
}

fn next_version(dir: &Path) -> Result<u32> {
    let mut highest: u64 = 0;
    for entry in fs::read_dir(dir).map_err(|e| io_error("create_change_set", dir, e))? {
        let entry = entry.map_err(|e| io_error("create_change_set", dir, e))?;
        if let Some(prefix) = digit_prefix(&entry.file_name().to_string_lossy()) {
            highest = highest.max(prefix);
        }
    }

    u32::try_from(highest.saturating_add(1)).map_err(|_| {
        MigError::new(MigErrorKind::InvalidChangeSet)
            .with_op("create_change_set")
            .with_message(format!("no version available after {}", highest))
    })
}

/// Both files or neither
fn write_pair(up_path: &Path, down_path: &Path) -> Result<()> {
    create_empty(up_path)?;
    if let Err(err) = create_empty(down_path) {
        discard_half_pair(up_path);
        return Err(err);
    }
    Ok(())
}

fn discard_half_pair(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "could not remove half-created change-set file"
        );
    }
}

fn create_empty(path: &Path) -> Result<()> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(ChangeSetError::AlreadyExists {
            path: path.display().to_string(),
        }
        .into()),
        Err(e) => Err(io_error("create_change_set", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmig_core::logging_facility::test_capture::init_test_capture;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("add_users-2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("add users").is_err());
        assert!(validate_name("../escape").is_err());
    }

    #[test]
    fn test_existing_down_file_leaves_no_up_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let up = dir.path().join("00003_x_up.sql");
        let down = dir.path().join("00003_x_down.sql");
        fs::write(&down, "-- keep").unwrap();

        let err = write_pair(&up, &down).unwrap_err();
        assert_eq!(err.kind(), MigErrorKind::InvalidChangeSet);
        assert!(!up.exists());
        assert_eq!(fs::read_to_string(&down).unwrap(), "-- keep");
    }

    #[test]
    fn test_failed_cleanup_is_logged() {
        let capture = init_test_capture();
        let dir = tempfile::TempDir::new().unwrap();
        let gone = dir.path().join("00007_gone_up.sql");

        discard_half_pair(&gone);

        let path = gone.display().to_string();
        let warnings = capture.events_with("path", &path);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, tracing::Level::WARN);
        assert!(warnings[0].field("error").is_some());
    }
}
