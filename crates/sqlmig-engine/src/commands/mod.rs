//! Command orchestration layer.
//!
//! Wraps a single migrator operation in connect/close so callers such as
//! the CLI issue one command per invocation.

pub mod engine_command;
