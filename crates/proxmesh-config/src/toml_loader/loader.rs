//! Read a config file, or fall back to the platform default path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use proxmesh_common::ConfigError;
use tracing::{info, warn};

use crate::schema::ProxmeshConfig;
use crate::validation;

use super::template::default_config_toml;

const APP_DIR: &str = "proxmesh";
const CONFIG_FILE: &str = "config.toml";

/// `<platform config dir>/proxmesh/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))
}

/// Write the commented template to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let write_failed =
        |e: std::io::Error| ConfigError::ParseError(format!("cannot write {}: {e}", path.display()));
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_failed)?;
    }
    std::fs::write(path, default_config_toml()).map_err(write_failed)?;
    info!(path = %path.display(), "Wrote default config");
    Ok(())
}

/// Parse the TOML file at `path`. Missing keys take their defaults.
///
/// Range problems are only logged here; [`crate::load_config`] is the
/// entry point that rejects them.
pub fn load_from_path(path: &Path) -> Result<ProxmeshConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };

    let config: ProxmeshConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "config has out-of-range values: {e}");
    }

    info!(path = %path.display(), "Config loaded");
    Ok(config)
}

/// Load `dirs::config_dir()/proxmesh/config.toml`, writing the commented
/// template there first when no file exists.
pub fn load_default() -> Result<ProxmeshConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            Ok(ProxmeshConfig::default())
        }
        other => other,
    }
}
