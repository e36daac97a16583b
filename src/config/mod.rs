//! Configuration management for Eator

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::session::TokenStore;

/// Default Eator API host
pub const DEFAULT_API_HOST: &str = "https://eator.onrender.com";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Custom API host (defaults to the hosted Eator API)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Raw session token as returned by `/api/login`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Seconds between background refreshes in `watch` (0 disables)
    #[serde(default)]
    pub refresh_interval_secs: u64,

    /// Lifetime of new pins when `--duration` is not given
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
}

fn default_duration_minutes() -> u32 {
    60
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            refresh_interval_secs: 0,
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".eator").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration, treating a missing file as the default config
    pub fn load_or_default_at(path: Option<&str>) -> Result<Self> {
        match Self::load_at(path) {
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            other => other,
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The token is a credential; keep the file private
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// API host, with an explicit override taking precedence
    pub fn api_host_or(&self, host_override: Option<&str>) -> String {
        host_override
            .map(str::to_string)
            .or_else(|| self.api_host.clone())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string())
    }
}

/// Session token persisted in the config file under the `token` key.
#[derive(Debug, Clone)]
pub struct ConfigTokenStore {
    path: Option<String>,
}

impl ConfigTokenStore {
    pub fn new(path: Option<&str>) -> Self {
        Self {
            path: path.map(str::to_string),
        }
    }

    fn update(&self, token: Option<String>) -> Result<()> {
        let path = self.path.as_deref();
        let mut config = Config::load_or_default_at(path)?;
        config.token = token;
        config.save_at(path)
    }
}

impl TokenStore for ConfigTokenStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(Config::load_or_default_at(self.path.as_deref())?.token)
    }

    fn save(&self, token: &str) -> Result<()> {
        self.update(Some(token.to_string()))
    }

    fn clear(&self) -> Result<()> {
        let path = self.path.as_deref();
        if !Config::resolve_path(path)?.exists() {
            return Ok(());
        }
        self.update(None)
    }
}
