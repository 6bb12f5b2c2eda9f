//! Configuration file resolution and loading

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path passed on the command line
    CommandLine(PathBuf),
    /// Path taken from the environment variable
    Environment(PathBuf),
    /// File found in the platform configuration directory
    ConfigDir(PathBuf),
    /// No file found; compiled defaults apply
    Defaults,
}

impl ConfigSource {
    /// Path of the file that was loaded, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p) | ConfigSource::Environment(p) | ConfigSource::ConfigDir(p) => {
                Some(p)
            }
            ConfigSource::Defaults => None,
        }
    }
}

/// Config file resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `<config dir>/<app_name>/config.toml` (and `/etc/<app_name>/config.toml` on Linux)
/// 4. Compiled defaults
///
/// An explicit path (1 or 2) that does not exist is an error; a missing
/// platform file silently falls through to defaults.
pub fn resolve_config_source(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    app_name: &str,
) -> Result<ConfigSource> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file given on command line not found: {}",
                path.display()
            )));
        }
        return Ok(ConfigSource::CommandLine(path.to_path_buf()));
    }

    // Priority 2: Environment variable
    if let Ok(raw) = std::env::var(env_var_name) {
        let path = PathBuf::from(raw);
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file from {} not found: {}",
                env_var_name,
                path.display()
            )));
        }
        return Ok(ConfigSource::Environment(path));
    }

    // Priority 3: Platform config directory
    if let Some(path) = platform_config_file(app_name) {
        return Ok(ConfigSource::ConfigDir(path));
    }

    // Priority 4: Defaults
    debug!("No config file found for {}, using defaults", app_name);
    Ok(ConfigSource::Defaults)
}

/// Locate an existing config file in the platform directories
fn platform_config_file(app_name: &str) -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(app_name).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(app_name).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    let parsed = toml::from_str::<T>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(parsed)
}

/// Resolve and load configuration, falling back to `T::default()`
pub fn load_config<T: DeserializeOwned + Default>(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    app_name: &str,
) -> Result<(T, ConfigSource)> {
    let source = resolve_config_source(cli_arg, env_var_name, app_name)?;

    let config = match source.path() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_toml(path)?
        }
        None => T::default(),
    };

    Ok((config, source))
}
