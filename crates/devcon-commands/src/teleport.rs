use devcon_core::Command;
use devcon_core::CommandError;
use tracing::info;

/// Moves the player to absolute coordinates: `teleport x y z`.
pub struct TeleportCommand;

impl TeleportCommand {
    fn coordinate(arguments: &[String], index: usize) -> Result<f32, CommandError> {
        let value = &arguments[index];
        value
            .parse::<f32>()
            .ok()
            .filter(|coordinate| coordinate.is_finite())
            .ok_or_else(|| CommandError::InvalidArgument {
                index,
                value: value.clone(),
                reason: "expected a finite number".to_string(),
            })
    }
}

impl Command for TeleportCommand {
    fn name(&self) -> &'static str {
        "teleport"
    }

    fn expected_arguments(&self) -> usize {
        3
    }

    fn description(&self) -> &'static str {
        "Teleport to the given x y z coordinates"
    }

    fn execute(&self, arguments: &[String]) -> Result<(), CommandError> {
        let x = Self::coordinate(arguments, 0)?;
        let y = Self::coordinate(arguments, 1)?;
        let z = Self::coordinate(arguments, 2)?;
        info!("Teleported to: ({x}, {y}, {z})");
        Ok(())
    }
}
