//! Diagnostic stream plumbing: the `tracing` layer that fans messages out to
//! sinks, the log file sink, and start-up log rotation.

pub mod buffer;
pub mod layer;
pub mod rotation;
pub mod sink;

use std::fmt;

use chrono::DateTime;
use chrono::Local;
use tracing::Level;

pub use buffer::*;
pub use layer::*;
pub use rotation::*;
pub use sink::*;

/// Severity as written into log lines, e.g. `[Warning]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Log,
    Debug,
    Trace,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Log => "Log",
            Self::Debug => "Debug",
            Self::Trace => "Trace",
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warning,
            Level::INFO => Self::Log,
            Level::DEBUG => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One message from the diagnostic stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub text: String,
    /// Where the message came from (the `tracing` target).
    pub context: String,
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
}

impl DiagnosticMessage {
    pub fn new(text: impl Into<String>, context: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            context: context.into(),
            severity,
            timestamp: Local::now(),
        }
    }

    /// `[{severity}] {text} {timestamp}`, the log file line format.
    pub fn log_line(&self) -> String {
        format!(
            "[{}] {} {}",
            self.severity,
            self.text,
            self.timestamp.format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// `[{severity}] {text}`, the on-screen format.
    pub fn console_line(&self) -> String {
        format!("[{}] {}", self.severity, self.text)
    }
}
