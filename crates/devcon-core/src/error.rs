use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a command handler. Dispatch hands it back to the caller
/// unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("argument {index} ({value:?}) is invalid: {reason}")]
    InvalidArgument {
        index: usize,
        value: String,
        reason: String,
    },
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command `{name}` is registered more than once")]
    DuplicateCommand { name: String },
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("archive directory {name:?} must be a single directory name")]
    InvalidArchiveDirectory { name: String },
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to archive log file {path}: {source}")]
    ArchiveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create log file {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
