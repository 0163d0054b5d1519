//! Human-facing progress reporting
//!
//! The engine never prints. It receives a `&dyn Reporter` at construction
//! and sends two classes of plain-text lines through it: progress and
//! errors. Structured diagnostics go through `tracing` separately.

use std::sync::Mutex;

/// Sink for progress and error lines
pub trait Reporter {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Writes progress to stdout and errors to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Forwards every line as a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(target: "sqlmig::report", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "sqlmig::report", "{}", message);
    }
}

/// Drops progress lines, forwards errors to the wrapped reporter
///
/// Used when stdout carries machine-readable output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorsOnly<R>(pub R);

impl<R: Reporter> Reporter for ErrorsOnly<R> {
    fn info(&self, _message: &str) {}

    fn error(&self, message: &str) {
        self.0.error(message);
    }
}

/// Level of a recorded line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Info,
    Error,
}

/// A line captured by [`RecordingReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub level: ReportLevel,
    pub message: String,
}

/// Keeps every line in memory, for assertions in tests
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(ReportLevel::Info)
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(ReportLevel::Error)
    }

    pub fn clear(&self) {
        self.lines.lock().map(|mut l| l.clear()).ok();
    }

    fn messages(&self, level: ReportLevel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.level == level)
            .map(|l| l.message)
            .collect()
    }

    fn push(&self, level: ReportLevel, message: &str) {
        self.lines
            .lock()
            .map(|mut lines| {
                lines.push(ReportLine {
                    level,
                    message: message.to_string(),
                })
            })
            .ok();
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(ReportLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(ReportLevel::Error, message);
    }
}
