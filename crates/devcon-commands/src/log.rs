use devcon_core::logging::Severity;
use devcon_core::Command;
use devcon_core::CommandError;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

/// Emits a message at a chosen severity: `log warning overheating`.
pub struct LogCommand;

fn parse_severity(value: &str) -> Option<Severity> {
    match value.to_ascii_lowercase().as_str() {
        "error" => Some(Severity::Error),
        "warning" | "warn" => Some(Severity::Warning),
        "log" | "info" => Some(Severity::Log),
        "debug" => Some(Severity::Debug),
        _ => None,
    }
}

impl Command for LogCommand {
    fn name(&self) -> &'static str {
        "log"
    }

    fn expected_arguments(&self) -> usize {
        2
    }

    fn description(&self) -> &'static str {
        "Emit a message at error, warning, log or debug severity"
    }

    fn execute(&self, arguments: &[String]) -> Result<(), CommandError> {
        let severity =
            parse_severity(&arguments[0]).ok_or_else(|| CommandError::InvalidArgument {
                index: 0,
                value: arguments[0].clone(),
                reason: "expected error, warning, log or debug".to_string(),
            })?;
        let text = &arguments[1];
        match severity {
            Severity::Error => error!("{text}"),
            Severity::Warning => warn!("{text}"),
            Severity::Log => info!("{text}"),
            Severity::Debug | Severity::Trace => debug!("{text}"),
        }
        Ok(())
    }
}
