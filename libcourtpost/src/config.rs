//! Configuration management for Courtpost

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const DEFAULT_CREDENTIALS_FILE: &str = "~/.config/courtpost/.env.twitter";
pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";
pub const DEFAULT_STATUS_URL_BASE: &str = "https://twitter.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the `KEY=VALUE` secrets file (tilde-expanded)
    pub credentials_file: String,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the posting API
    pub base_url: String,
    /// Base of the public status URLs handed back to the operator
    pub status_url_base: String,
    /// Upper bound on the single submission request
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_file: DEFAULT_CREDENTIALS_FILE.to_string(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            status_url_base: DEFAULT_STATUS_URL_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file at the default location yields the defaults. A path
    /// given through `COURTPOST_CONFIG` must exist.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os("COURTPOST_CONFIG").is_some();
        let config_path = resolve_config_path()?;

        if !explicit && !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Credentials file path with `~` expanded
    pub fn credentials_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.credentials_file).to_string())
    }
}

/// Resolve the configuration file path following XDG conventions
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("COURTPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

    Ok(config_dir.join("courtpost").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CourtpostError;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.credentials_file, DEFAULT_CREDENTIALS_FILE);
        assert_eq!(config.api.base_url, "https://api.twitter.com");
        assert_eq!(config.api.status_url_base, "https://twitter.com");
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_secs = 5\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, DEFAULT_API_BASE);
        assert_eq!(config.credentials_file, DEFAULT_CREDENTIALS_FILE);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "credentials_file = [not valid").unwrap();

        let result = Config::load_from_path(&path);
        assert!(matches!(
            result,
            Err(CourtpostError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_credentials_path_expands_tilde() {
        let config = Config::default();
        assert!(config
            .credentials_path()
            .ends_with(".config/courtpost/.env.twitter"));

        let absolute = Config {
            credentials_file: "/etc/courtpost/.env.twitter".to_string(),
            ..Config::default()
        };
        assert_eq!(
            absolute.credentials_path(),
            PathBuf::from("/etc/courtpost/.env.twitter")
        );
    }

    #[test]
    #[serial]
    fn test_load_from_env_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "credentials_file = \"/srv/secrets/.env.twitter\"\n").unwrap();

        std::env::set_var("COURTPOST_CONFIG", &path);
        let result = Config::load();
        std::env::remove_var("COURTPOST_CONFIG");

        let config = result.unwrap();
        assert_eq!(config.credentials_file, "/srv/secrets/.env.twitter");
    }

    #[test]
    #[serial]
    fn test_explicit_missing_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        std::env::set_var("COURTPOST_CONFIG", &path);
        let result = Config::load();
        std::env::remove_var("COURTPOST_CONFIG");

        assert!(matches!(
            result,
            Err(CourtpostError::Config(ConfigError::Read { .. }))
        ));
    }
}
