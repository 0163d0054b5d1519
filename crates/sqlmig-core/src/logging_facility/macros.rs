//! Canonical logging macros
//!
//! Every engine operation logs exactly one start event and one end (or
//! end_error) event, tagged with `component`, `op` and `event`.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use sqlmig_core::log_op_start;
/// log_op_start!("up");
/// log_op_start!("up", local_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use sqlmig_core::log_op_end;
/// log_op_end!("up", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Takes the error by reference; it must be a [`MigError`](crate::errors::MigError).
///
/// # Example
///
/// ```
/// # use sqlmig_core::log_op_error;
/// # use sqlmig_core::errors::{MigError, MigErrorKind};
/// let err = MigError::new(MigErrorKind::NotFound);
/// log_op_error!("down", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let mig_err: &$crate::errors::MigError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?mig_err.kind(),
            err.code = mig_err.code(),
            err.root = mig_err.root_kind().code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let mig_err: &$crate::errors::MigError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?mig_err.kind(),
            err.code = mig_err.code(),
            err.root = mig_err.root_kind().code(),
            $($field)*
        );
    }};
}
