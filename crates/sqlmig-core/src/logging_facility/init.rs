//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.
//! Every profile writes to stderr so stdout stays free for reporter output.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

const DEV_FILTER: &str = "sqlmig=debug,sqlmig_core=debug,sqlmig_store=debug,sqlmig_engine=debug";
const PROD_FILTER: &str = "sqlmig=info,sqlmig_core=info,sqlmig_store=info,sqlmig_engine=info";
const QUIET_FILTER: &str = "warn";

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON structured output at info level
    Production,
    /// Human-readable warnings and errors only (CLI default)
    Quiet,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize the logging facility
///
/// Call once at start-up; later calls are ignored. `RUST_LOG` overrides the
/// profile's default filter.
///
/// # Example
///
/// ```
/// use sqlmig_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter_or(DEV_FILTER))
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(filter_or(PROD_FILTER))
                .init();
        }
        Profile::Quiet => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_env_filter(filter_or(QUIET_FILTER))
                .init();
        }
        Profile::Test => {
            // Test capture is initialized separately via init_test_capture()
            tracing_subscriber::registry().init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Quiet);
    }

    #[test]
    fn test_profile_equality() {
        assert_eq!(Profile::Quiet, Profile::Quiet);
        assert_ne!(Profile::Development, Profile::Production);
    }
}
