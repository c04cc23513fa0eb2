pub mod command;
pub mod config;
pub mod environment;
pub mod error;
pub mod input;
pub mod logging;
pub mod registry;

pub use command::*;
pub use config::*;
pub use environment::*;
pub use error::*;
pub use input::*;
pub use registry::*;
