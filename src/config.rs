//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$DISPATCHMAIL_CONFIG` (environment variable)
//! 2. `~/.config/dispatchmail/config.toml` (Linux/macOS)
//!    `%APPDATA%\dispatchmail\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Dispatch parsing settings.
    pub parse: ParseConfig,
    /// Batch import settings.
    pub import: ImportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Dispatch parsing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// IANA zone of dates without a `UTC±HH` marker and of the import
    /// stamp (default: `America/New_York`, daylight saving included).
    pub timezone: String,
    /// Label printed after the import stamp.
    pub timezone_label: String,
    /// Maximum description length in characters.
    pub description_limit: usize,
    /// Maximum building name length in characters.
    pub building_limit: usize,
}

/// Batch import settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Largest batch an unattended (non-manual) import will process.
    pub max_auto_import: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            timezone: "America/New_York".to_string(),
            timezone_label: "EST".to_string(),
            description_limit: 2000,
            building_limit: 200,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_auto_import: 50,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Configuration from the standard location, or defaults.
///
/// An unreadable or malformed file is logged and ignored.
pub fn load_config() -> Config {
    let Some(path) = config_file_path().filter(|p| p.exists()) else {
        return Config::default();
    };
    match load_config_from(&path) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "Loaded config");
            cfg
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring config file, using defaults");
            Config::default()
        }
    }
}

/// Read and parse one TOML config file.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| DispatchError::io(path, e))?;
    toml::from_str(&contents)
        .map_err(|e| DispatchError::Config(format!("{}: {e}", path.display())))
}

/// Write `config` to the standard location and return the path written.
pub fn save_config(config: &Config) -> Result<PathBuf> {
    let path = config_file_path()
        .ok_or_else(|| DispatchError::Config("no config directory on this platform".into()))?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Write `config` as TOML to `path`, creating parent directories.
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DispatchError::io(parent, e))?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| DispatchError::Config(e.to_string()))?;
    std::fs::write(path, contents).map_err(|e| DispatchError::io(path, e))?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// `$DISPATCHMAIL_CONFIG`, else `<config dir>/dispatchmail/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("DISPATCHMAIL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("dispatchmail").join("config.toml"))
}

/// Directory holding `dispatchmail.log`.
pub fn cache_dir(config: &Config) -> PathBuf {
    config.general.cache_dir.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dispatchmail")
    })
}
