//! Loading change-sets from a directory

use crate::changesets::{DOWN_SUFFIX, UP_SUFFIX};
use crate::errors::{io_error, Result};
use sqlmig_core::{ChangeSet, ChangeSetError, Direction};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed script file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFile {
    pub version: u32,
    pub name: String,
    pub direction: Direction,
}

/// Parse `<version>_<name>_{up,down}.sql`
///
/// Returns `Ok(None)` for names that do not start with a digit; those
/// files are not change-sets and are skipped by the loader.
pub fn parse_file_name(
    file_name: &str,
) -> std::result::Result<Option<ScriptFile>, ChangeSetError> {
    if !file_name.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(None);
    }

    let invalid = || ChangeSetError::InvalidFileName {
        file_name: file_name.to_string(),
    };

    let (stem, direction) = if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
        (stem, Direction::Up)
    } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
        (stem, Direction::Down)
    } else {
        return Err(invalid());
    };

    let (digits, name) = stem.split_once('_').ok_or_else(invalid)?;
    if name.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let version: u32 = digits.parse().map_err(|_| invalid())?;
    if version == 0 {
        return Err(invalid());
    }

    Ok(Some(ScriptFile {
        version,
        name: name.to_string(),
        direction,
    }))
}

#[derive(Default)]
struct Pair {
    up: Option<(String, PathBuf)>,
    down: Option<(String, PathBuf)>,
}

/// Load every change-set in `dir`, version ascending
///
/// Versions must run 1..N without gaps, each with both scripts under the
/// same name.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<ChangeSet>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| io_error("load_change_sets", dir, e))?;

    let mut pairs: BTreeMap<u32, Pair> = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| io_error("load_change_sets", dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();

        let Some(script) = parse_file_name(&file_name)? else {
            continue;
        };

        let pair = pairs.entry(script.version).or_default();
        let slot = match script.direction {
            Direction::Up => &mut pair.up,
            Direction::Down => &mut pair.down,
        };
        if slot.is_some() {
            return Err(ChangeSetError::DuplicateScript {
                version: script.version,
                direction: script.direction.as_str(),
            }
            .into());
        }
        *slot = Some((script.name, path));
    }

    let mut change_sets = Vec::with_capacity(pairs.len());
    for (expected, (version, pair)) in (1u32..).zip(pairs) {
        if version != expected {
            return Err(ChangeSetError::VersionGap {
                expected,
                found: version,
            }
            .into());
        }

        let (up_name, up_path) = pair.up.ok_or(ChangeSetError::MissingScript {
            version,
            direction: Direction::Up.as_str(),
        })?;
        let (down_name, down_path) = pair.down.ok_or(ChangeSetError::MissingScript {
            version,
            direction: Direction::Down.as_str(),
        })?;
        if up_name != down_name {
            return Err(ChangeSetError::NameMismatch {
                version,
                up_name,
                down_name,
            }
            .into());
        }

        let up_script = fs::read_to_string(&up_path)
            .map_err(|e| io_error("load_change_sets", &up_path, e))?;
        let down_script = fs::read_to_string(&down_path)
            .map_err(|e| io_error("load_change_sets", &down_path, e))?;

        change_sets.push(ChangeSet::new(version, up_name, up_script, down_script));
    }

    tracing::debug!(dir = %dir.display(), count = change_sets.len(), "loaded change-sets");
    Ok(change_sets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_with_underscores() {
        let parsed = parse_file_name("00002_add_table_up.sql").unwrap().unwrap();
        assert_eq!(parsed.version, 2);
        assert_eq!(parsed.name, "add_table");
        assert_eq!(parsed.direction, Direction::Up);
    }

    #[test]
    fn test_parse_skips_non_digit_files() {
        assert_eq!(parse_file_name("README.md").unwrap(), None);
        assert_eq!(parse_file_name(".gitkeep").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_malformed_digit_files() {
        for bad in [
            "00001_init.sql",
            "00001_up.sql",
            "0_init_up.sql",
            "1a_init_up.sql",
            "00001_init_sideways.sql",
        ] {
            assert!(
                matches!(
                    parse_file_name(bad),
                    Err(ChangeSetError::InvalidFileName { .. })
                ),
                "{} should be rejected",
                bad
            );
        }
    }
}
