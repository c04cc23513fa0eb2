use devcon_core::Command;
use devcon_core::CommandError;
use tracing::info;

pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn expected_arguments(&self) -> usize {
        1
    }

    fn description(&self) -> &'static str {
        "Print a single word back to the console"
    }

    fn execute(&self, arguments: &[String]) -> Result<(), CommandError> {
        info!("{}", arguments[0]);
        Ok(())
    }
}
