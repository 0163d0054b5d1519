pub mod change_set;
pub mod record;
pub mod status;

pub use change_set::{ChangeSet, Direction};
pub use record::LedgerRecord;
pub use status::Status;
