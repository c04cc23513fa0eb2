//! Command trait shared by every console command.

use crate::error::CommandError;

/// A console command.
///
/// Each implementation declares its own name and arity, so registering a new
/// command never requires touching the registry. One instance is created at
/// start-up and reused for every invocation.
pub trait Command: Send + Sync {
    /// Name typed at the console. Matched case-sensitively.
    fn name(&self) -> &'static str;

    /// Exact number of arguments `execute` accepts.
    fn expected_arguments(&self) -> usize;

    /// One-line summary shown in command listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Runs the command. Only called with exactly `expected_arguments()`
    /// arguments.
    fn execute(&self, arguments: &[String]) -> Result<(), CommandError>;
}

/// Read-only view of one registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub expected_arguments: usize,
    pub description: &'static str,
}

impl CommandInfo {
    pub fn of(command: &dyn Command) -> Self {
        Self {
            name: command.name(),
            expected_arguments: command.expected_arguments(),
            description: command.description(),
        }
    }
}
