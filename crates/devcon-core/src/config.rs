use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::environment::Mode;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub console: ConsoleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Category the active environment must fall in for log files to be
    /// written.
    pub level: Mode,
    pub directory: PathBuf,
    /// Archive directory name, created inside `directory`. Must be a single
    /// plain directory name.
    pub archive_directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Mode::BUILD,
            directory: PathBuf::from("logs"),
            archive_directory: "logs.old".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn archive_path(&self) -> PathBuf {
        self.directory.join(&self.archive_directory)
    }

    /// True when `archive_directory` names exactly one normal path component,
    /// so the archive can never resolve to the log directory or outside it.
    pub fn has_valid_archive_name(&self) -> bool {
        let mut components = Path::new(&self.archive_directory).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Messages kept on screen.
    pub scrollback: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { scrollback: 500 }
    }
}
