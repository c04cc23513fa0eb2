use std::fs;
use std::path::Path;
use std::path::PathBuf;

use devcon_core::Config;
use devcon_core::ConfigError;

pub const CONFIG_FILE: &str = "devcon.toml";

/// Loads the console configuration.
///
/// An explicit path must exist. Otherwise `./devcon.toml` and then
/// `{config_dir}/devcon/devcon.toml` are tried, falling back to defaults when
/// neither exists.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return read(path);
    }
    match default_locations().into_iter().find(|path| path.is_file()) {
        Some(path) => read(&path),
        None => Ok(Config::default()),
    }
}

pub fn read(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join("devcon").join(CONFIG_FILE));
    }
    locations
}
