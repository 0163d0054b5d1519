//! Ledger status values
//!
//! `Pending` is never persisted: it is the absence of a record. The
//! remaining values are stored as lowercase words.

use crate::errors::{MigError, MigErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of one change-set version in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No record exists yet
    Pending,
    /// Up script is running (transient)
    Applying,
    /// Up script succeeded (terminal)
    Applied,
    /// The last up or down attempt failed (terminal)
    Error,
    /// Down script is running (transient)
    Reverting,
    /// Down script succeeded (terminal)
    Reverted,
}

impl Status {
    /// Statuses that may appear in a persisted record
    pub const PERSISTED: [Status; 5] = [
        Status::Applying,
        Status::Applied,
        Status::Error,
        Status::Reverting,
        Status::Reverted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Applying => "applying",
            Status::Applied => "applied",
            Status::Error => "error",
            Status::Reverting => "reverting",
            Status::Reverted => "reverted",
        }
    }

    /// Applying/Reverting: must be followed by a terminal write
    pub fn is_transient(&self) -> bool {
        matches!(self, Status::Applying | Status::Reverting)
    }

    /// Applied/Error/Reverted
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Applied | Status::Error | Status::Reverted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = MigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "applying" => Ok(Status::Applying),
            "applied" => Ok(Status::Applied),
            "error" => Ok(Status::Error),
            "reverting" => Ok(Status::Reverting),
            "reverted" => Ok(Status::Reverted),
            other => Err(MigError::new(MigErrorKind::UnexpectedStatus)
                .with_op("parse_status")
                .with_message(format!("unrecognised status '{}'", other))),
        }
    }
}
