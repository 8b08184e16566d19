//! Configuration loading and database location resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument / its environment variable (highest priority)
//! 2. `DATABASE_URL` environment variable (database location only)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Application directory name used under the platform config/data dirs
pub const APP_DIR_NAME: &str = "composer-catalog";

/// Default listen address
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5080;

/// Default metadata fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent sent by the metadata fetcher
pub const DEFAULT_USER_AGENT: &str = concat!("composer-catalog/", env!("CARGO_PKG_VERSION"));

/// Settings readable from the TOML config file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub api_token: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// Values supplied on the command line (or their environment variables)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub api_token: Option<String>,
    pub config_file: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_path: PathBuf,
    /// Token required on JSON mutation endpoints. `None` disables the check.
    pub api_token: Option<String>,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

impl CatalogConfig {
    /// Resolve configuration from overrides, the process environment and the
    /// config file.
    ///
    /// An explicitly named config file must exist and parse. The default
    /// config file is optional: if it is missing, compiled defaults apply.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let toml_config = match &overrides.config_file {
            Some(path) => {
                info!("Loading config file: {}", path.display());
                Some(TomlConfig::load(path)?)
            }
            None => match default_config_file() {
                Some(path) if path.exists() => {
                    info!("Loading config file: {}", path.display());
                    Some(TomlConfig::load(&path)?)
                }
                _ => {
                    info!("No config file found, using defaults");
                    None
                }
            },
        };

        let database_url = std::env::var("DATABASE_URL").ok();
        Ok(Self::from_sources(overrides, database_url.as_deref(), toml_config.as_ref()))
    }

    /// Merge already-loaded sources following the priority order
    pub fn from_sources(
        overrides: &ConfigOverrides,
        database_url: Option<&str>,
        toml_config: Option<&TomlConfig>,
    ) -> Self {
        let file = toml_config.cloned().unwrap_or_default();

        let database_path = overrides
            .database_path
            .clone()
            .or_else(|| database_url.and_then(database_path_from_url))
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let api_token = overrides
            .api_token
            .clone()
            .or(file.api_token)
            .filter(|token| !token.is_empty());

        let fetch_timeout_secs = match file.fetch_timeout_secs {
            Some(0) => {
                warn!(
                    "fetch_timeout_secs = 0 is not allowed, using {}",
                    DEFAULT_FETCH_TIMEOUT_SECS
                );
                DEFAULT_FETCH_TIMEOUT_SECS
            }
            Some(secs) => secs,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Self {
            bind_addr: overrides
                .bind_addr
                .clone()
                .or(file.bind_addr)
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            database_path,
            api_token,
            fetch_timeout_secs,
            user_agent: file
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }

    /// `host:port` string for binding the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Extract a filesystem path from a `sqlite://` style database URL.
///
/// Accepts `sqlite://path`, `sqlite:path` and bare paths; any `?query`
/// suffix is dropped. In-memory URLs and other schemes yield `None`.
pub fn database_path_from_url(url: &str) -> Option<PathBuf> {
    let url = url.trim();
    let without_query = url.split('?').next().unwrap_or(url);

    let path = if let Some(rest) = without_query.strip_prefix("sqlite://") {
        rest
    } else if let Some(rest) = without_query.strip_prefix("sqlite:") {
        rest
    } else if without_query.contains("://") {
        warn!("Ignoring non-SQLite DATABASE_URL: {}", url);
        return None;
    } else {
        without_query
    };

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Platform config file location (`~/.config/composer-catalog/config.toml` on Linux)
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// OS-dependent default database path
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./catalog_data"))
        .join("catalog.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_from_url_variants() {
        assert_eq!(
            database_path_from_url("sqlite:///var/lib/catalog.db"),
            Some(PathBuf::from("/var/lib/catalog.db"))
        );
        assert_eq!(
            database_path_from_url("sqlite://local.db?mode=rwc"),
            Some(PathBuf::from("local.db"))
        );
        assert_eq!(database_path_from_url("sqlite:local.db"), Some(PathBuf::from("local.db")));
        assert_eq!(database_path_from_url("/tmp/x.db"), Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(database_path_from_url("sqlite::memory:"), None);
        assert_eq!(database_path_from_url("postgres://localhost/db"), None);
    }

    #[test]
    fn test_default_database_path_file_name() {
        let path = default_database_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("catalog.db"));
    }
}
