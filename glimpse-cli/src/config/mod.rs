//! Configuration management for glimpse-cli.
//!
//! Settings are layered in this order:
//! 1. Default values
//! 2. Config file (`~/.glimpse/config.toml`)
//! 3. Environment variables (`GEMINI_MODEL`, `GEMINI_BASE_URL`)
//! 4. Command-line flags
//!
//! The API key is never stored in the file; it comes from `GOOGLE_API_KEY`.

mod schema;

pub use schema::{AppConfig, ConfigIssue, IssueLevel};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".glimpse")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a specific path, falling back to defaults when the file is missing.
pub async fn load_config_from(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Load configuration and reject it when validation reports errors.
pub async fn load_valid_config(path: &Path) -> ConfigResult<AppConfig> {
    let config = load_config_from(path).await?.with_env();
    let errors: Vec<String> = config
        .validate()
        .into_iter()
        .filter(|issue| issue.level == IssueLevel::Error)
        .map(|issue| issue.to_string())
        .collect();

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::InvalidValue(errors.join("; ")))
    }
}

/// Save configuration to a specific path.
pub async fn save_config_to(config: &AppConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Write a default configuration to `path`.
///
/// An existing file is kept unless `force` is set. Returns whether a file was written.
pub async fn init_config(path: &Path, force: bool) -> ConfigResult<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    save_config_to(&AppConfig::default(), path).await?;
    Ok(true)
}
