use std::collections::BTreeMap;
use std::fmt;

use tracing::error;

use crate::command::Command;
use crate::command::CommandInfo;
use crate::error::CommandError;
use crate::error::RegistryError;
use crate::input::CommandLine;

/// How a dispatch ended when the handler itself did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Executed,
    UnknownCommand,
    ArgumentCountMismatch { expected: usize, actual: usize },
}

/// Name to handler table, built once at start-up and read-only afterwards.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Builds the table from the statically known command set.
    ///
    /// Names must be unique. A duplicate aborts construction instead of
    /// letting one command silently shadow another.
    pub fn initialize<I>(commands: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = Box<dyn Command>>,
    {
        let mut table = BTreeMap::new();
        for command in commands {
            let name = command.name();
            if table.insert(name, command).is_some() {
                return Err(RegistryError::DuplicateCommand {
                    name: name.to_string(),
                });
            }
        }
        Ok(Self { commands: table })
    }

    /// Registered commands ordered by name.
    pub fn commands(&self) -> impl Iterator<Item = CommandInfo> + '_ {
        self.commands
            .values()
            .map(|command| CommandInfo::of(command.as_ref()))
    }

    /// Looks up `name`, checks the argument count and runs the handler on the
    /// calling thread.
    ///
    /// Unknown names and arity mismatches are reported once on the diagnostic
    /// stream and returned as a [`Dispatch`] outcome. An error returned by the
    /// handler is passed through untouched.
    pub fn try_execute(
        &self,
        name: &str,
        arguments: &[String],
    ) -> Result<Dispatch, CommandError> {
        let Some(command) = self.commands.get(name) else {
            error!("Unknown command: {name}");
            return Ok(Dispatch::UnknownCommand);
        };

        let expected = command.expected_arguments();
        let actual = arguments.len();
        if actual != expected {
            error!("Error executing {name}; Expected {expected} arguments, got {actual}");
            return Ok(Dispatch::ArgumentCountMismatch { expected, actual });
        }

        command.execute(arguments)?;
        Ok(Dispatch::Executed)
    }

    /// Parses a raw console line and dispatches it. Blank lines dispatch
    /// nothing and yield `None`.
    pub fn dispatch_line(&self, line: &str) -> Result<Option<Dispatch>, CommandError> {
        let Some(parsed) = CommandLine::parse(line) else {
            return Ok(None);
        };
        self.try_execute(&parsed.name, &parsed.arguments).map(Some)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
