//! Configuration management for locatif.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::IpAddr;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "locatif";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "locatif.db";

/// Prefix of the environment variables read into the configuration.
const ENV_PREFIX: &str = "LOCATIF_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LOCATIF_`, sections split on `__`)
/// 2. TOML config file at `~/.config/locatif/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Web server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// Web server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on. Must be a loopback address.
    pub host: String,
    /// First port to try.
    pub port: u16,
    /// How many consecutive ports to try, starting at `port`.
    pub port_attempts: u16,
    /// Open the dashboard in the default browser once listening.
    pub open_browser: bool,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/locatif/locatif.db`
    pub database_path: Option<PathBuf>,
    /// Insert two demo properties into an empty database at startup.
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            port_attempts: 100,
            open_browser: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            seed_demo_data: true,
        }
    }
}

impl ServerConfig {
    /// The listen address, if it parses as an IP.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `host` is not an IP address.
    pub fn ip(&self) -> Result<IpAddr> {
        self.host.parse().map_err(|_| Error::ConfigValidation {
            message: format!("server.host '{}' is not an IP address", self.host),
        })
    }

    /// The last port of the search range.
    #[must_use]
    pub fn last_port(&self) -> Option<u16> {
        self.port_attempts
            .checked_sub(1)
            .and_then(|extra| self.port.checked_add(extra))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `LOCATIF_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Self::figment(config_path).extract::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// The layered configuration sources.
    fn figment(config_path: Option<PathBuf>) -> Figment {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let ip = self.server.ip()?;
        if !ip.is_loopback() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "server.host must be a loopback address, got {}",
                    self.server.host
                ),
            });
        }

        if self.server.port_attempts == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port_attempts must be greater than 0".to_string(),
            });
        }

        if self.server.last_port().is_none() {
            return Err(Error::ConfigValidation {
                message: format!(
                    "server.port ({}) + server.port_attempts ({}) exceeds 65535",
                    self.server.port, self.server.port_attempts
                ),
            });
        }

        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "storage.database_path cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
