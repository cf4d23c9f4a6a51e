use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TODO_CONFIG";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "TODO_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
    /// Where the list is stored.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// How long a command waits for another process holding the store lock.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            output: None,
            data_dir: None,
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl UserConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Default config location: `<config_dir>/todo/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("todo/config.toml"))
}

/// Load the config named by `TODO_CONFIG`, else the default location.
///
/// A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(default_config_path);
    match path {
        Some(path) => load_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load config from an explicit path; missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pick the data directory.
///
/// Precedence: explicit flag, `TODO_DATA_DIR`, config `data_dir`, then the
/// platform data directory joined with `todo`.
///
/// # Errors
///
/// Returns an error if nothing is configured and the platform has no data
/// directory.
pub fn resolve_data_dir(cli_dir: Option<&Path>, config: &UserConfig) -> Result<PathBuf> {
    let env_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
    resolve_data_dir_inner(cli_dir, env_dir, config, dirs::data_dir())
}

fn resolve_data_dir_inner(
    cli_dir: Option<&Path>,
    env_dir: Option<PathBuf>,
    config: &UserConfig,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }
    platform_dir
        .map(|dir| dir.join("todo"))
        .context("No data directory available; pass --data-dir or set TODO_DATA_DIR")
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}
