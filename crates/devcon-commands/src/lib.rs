//! Built-in console commands.
//!
//! Adding a command means implementing [`devcon_core::Command`] in its own
//! module and listing it in [`builtin`]. The registry itself never changes.

pub mod echo;
pub mod log;
pub mod teleport;

use devcon_core::Command;

pub use echo::EchoCommand;
pub use log::LogCommand;
pub use teleport::TeleportCommand;

/// Every command shipped with the console, one instance each.
pub fn builtin() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(TeleportCommand),
        Box::new(EchoCommand),
        Box::new(LogCommand),
    ]
}
