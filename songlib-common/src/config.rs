//! Configuration loading for the catalog service
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_CONFIG: &str = "SONGLIB_CONFIG";
pub const ENV_DATABASE: &str = "SONGLIB_DATABASE";
pub const ENV_HOST: &str = "SONGLIB_HOST";
pub const ENV_PORT: &str = "APP_PORT";
pub const ENV_EXTERNAL_API_URL: &str = "EXTERNAL_API_URL";
pub const ENV_EXTERNAL_API_TIMEOUT: &str = "EXTERNAL_API_TIMEOUT_SECS";
pub const ENV_LOG: &str = "SONGLIB_LOG";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_EXTERNAL_API_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the optional TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub external_api_url: Option<String>,
    pub external_api_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub external_api_url: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Listen address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Song detail lookup endpoint; `None` selects the fixed fallback payload
    pub external_api_url: Option<String>,
    /// Timeout for a single detail lookup; `None` means no limit
    pub external_api_timeout: Option<Duration>,
    /// Default tracing filter directive
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, process environment and TOML file
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        Self::resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve configuration using `env` as the environment lookup
    pub fn resolve_with<F>(overrides: &ConfigOverrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty environment values are treated as unset
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let file = match overrides
            .config_path
            .clone()
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
        {
            Some(path) => load_toml_config(&path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => load_toml_config(&path)?,
                None => TomlConfig::default(),
            },
        };

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| env(ENV_DATABASE).map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let host = overrides
            .host
            .clone()
            .or_else(|| env(ENV_HOST))
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match overrides.port {
            Some(port) => port,
            None => match env(ENV_PORT) {
                Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                    Error::Config(format!("{} is not a valid port: {}", ENV_PORT, raw))
                })?,
                None => file.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let external_api_url = overrides
            .external_api_url
            .clone()
            .or_else(|| env(ENV_EXTERNAL_API_URL))
            .or(file.external_api_url)
            .filter(|url| !url.trim().is_empty());

        let timeout_secs = match env(ENV_EXTERNAL_API_TIMEOUT) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!(
                    "{} is not a number of seconds: {}",
                    ENV_EXTERNAL_API_TIMEOUT, raw
                ))
            })?,
            None => file
                .external_api_timeout_secs
                .unwrap_or(DEFAULT_EXTERNAL_API_TIMEOUT_SECS),
        };

        let log_level = overrides
            .log_level
            .clone()
            .or_else(|| env(ENV_LOG))
            .or(file.log_level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            database_path,
            host,
            port,
            external_api_url,
            // 0 disables the limit
            external_api_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            log_level,
        })
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    debug!("Loading config file: {}", path.display());

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Platform config file location (`<config_dir>/songlib/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("songlib").join("config.toml"))
}

/// Platform default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("songlib"))
        .unwrap_or_else(|| PathBuf::from("./songlib_data"))
        .join("songlib.db")
}
