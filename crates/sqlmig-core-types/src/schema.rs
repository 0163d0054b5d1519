//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Change-set identifiers
pub const FIELD_VERSION: &str = "version";
pub const FIELD_CHANGE_SET: &str = "change_set";
pub const FIELD_STATUS: &str = "status";

// Collection sizes
pub const FIELD_LOCAL_COUNT: &str = "local_count";
pub const FIELD_APPLIED_COUNT: &str = "applied_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Engine operation names
pub const OP_CONNECT: &str = "connect";
pub const OP_CLOSE: &str = "close";
pub const OP_UP: &str = "up";
pub const OP_DOWN: &str = "down";
pub const OP_REDO: &str = "redo";
pub const OP_STATUS: &str = "status";
pub const OP_DB_VERSION: &str = "dbversion";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_op_names_are_distinct() {
        let ops = [
            OP_CONNECT,
            OP_CLOSE,
            OP_UP,
            OP_DOWN,
            OP_REDO,
            OP_STATUS,
            OP_DB_VERSION,
        ];
        for (i, a) in ops.iter().enumerate() {
            for b in &ops[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
