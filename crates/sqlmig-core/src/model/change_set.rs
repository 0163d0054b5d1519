//! Locally defined change-sets

/// One versioned unit of forward and backward SQL
///
/// Produced by the loader, owned by the engine for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub version: u32,
    pub name: String,
    pub up_script: String,
    pub down_script: String,
}

impl ChangeSet {
    pub fn new(
        version: u32,
        name: impl Into<String>,
        up_script: impl Into<String>,
        down_script: impl Into<String>,
    ) -> Self {
        Self {
            version,
            name: name.into(),
            up_script: up_script.into(),
            down_script: down_script.into(),
        }
    }

    /// The script executed when moving in `direction`
    pub fn script(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up_script,
            Direction::Down => &self.down_script,
        }
    }
}

/// Direction of a single transition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Transient status written before the script runs
    pub fn in_flight_status(&self) -> crate::model::Status {
        match self {
            Direction::Up => crate::model::Status::Applying,
            Direction::Down => crate::model::Status::Reverting,
        }
    }

    /// Terminal status written after the script succeeds
    pub fn done_status(&self) -> crate::model::Status {
        match self {
            Direction::Up => crate::model::Status::Applied,
            Direction::Down => crate::model::Status::Reverted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}
