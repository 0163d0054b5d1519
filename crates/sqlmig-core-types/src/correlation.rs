//! Correlation types for tying log events to a single invocation
//!
//! Every engine invocation (one `up`, `down`, `redo`, `status` or
//! `dbversion`) carries a `RunId`. Structured log events and errors record
//! it so that the lines of one run can be pulled out of a shared log.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single engine invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generate a new RunId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization or replays)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
