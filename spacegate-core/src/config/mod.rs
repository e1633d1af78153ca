//! Configuration management for SpaceGate
//!
//! Defaults, TOML files and `SPACEGATE_<SECTION>_<KEY>` environment
//! overrides, validated before use.

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Storage configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Space creation flow configuration
    pub form: FormConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,

    /// Graceful shutdown timeout
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. `:memory:` keeps everything in memory.
    pub database_path: PathBuf,

    /// Maximum pooled connections
    pub pool_size: u32,

    /// How long SQLite waits on a locked database before failing
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle lifetime of a session token
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
}

/// Space creation flow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Wait between the success notification and the redirect
    #[serde(with = "humantime_serde")]
    pub redirect_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_body_bytes: 64 * 1024,
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/spacegate.db"),
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Path that selects an in-memory database
    pub const IN_MEMORY: &'static str = ":memory:";

    /// Configuration for a throwaway in-memory database
    pub fn in_memory() -> Self {
        Self {
            database_path: PathBuf::from(Self::IN_MEMORY),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == Self::IN_MEMORY
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            redirect_delay: Duration::from_secs(2),
        }
    }
}

/// Read `key` from the environment and parse it, if set
fn env_override<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::env(key, &raw, e)),
        Err(_) => Ok(None),
    }
}

fn env_duration(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(key) {
        Ok(raw) => humantime_serde::re::humantime::parse_duration(&raw)
            .map(Some)
            .map_err(|e| ConfigError::env(key, &raw, e)),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Defaults overlaid with `SPACEGATE_<SECTION>_<KEY>` variables,
    /// e.g. `SPACEGATE_SERVER_BIND_ADDRESS=0.0.0.0:3000`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables on top of the current values
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(addr) = env_override("SPACEGATE_SERVER_BIND_ADDRESS")? {
            self.server.bind_address = addr;
        }
        if let Some(max_body) = env_override("SPACEGATE_SERVER_MAX_BODY_BYTES")? {
            self.server.max_body_bytes = max_body;
        }
        if let Some(timeout) = env_duration("SPACEGATE_SERVER_SHUTDOWN_TIMEOUT")? {
            self.server.shutdown_timeout = timeout;
        }

        if let Some(path) = env_override::<PathBuf>("SPACEGATE_STORE_DATABASE_PATH")? {
            self.store.database_path = path;
        }
        if let Some(pool_size) = env_override("SPACEGATE_STORE_POOL_SIZE")? {
            self.store.pool_size = pool_size;
        }

        if let Some(level) = env_override::<String>("SPACEGATE_LOG_LEVEL")? {
            self.logging.level = level.to_lowercase();
        }
        if let Some(json) = env_override("SPACEGATE_LOG_JSON")? {
            self.logging.json_format = json;
        }

        if let Some(ttl) = env_duration("SPACEGATE_SESSION_TTL")? {
            self.session.ttl = ttl;
        }
        if let Some(delay) = env_duration("SPACEGATE_FORM_REDIRECT_DELAY")? {
            self.form.redirect_delay = delay;
        }

        Ok(())
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.server.max_body_bytes == 0 {
            return invalid("server.max_body_bytes must be greater than 0");
        }
        if self.store.database_path.as_os_str().is_empty() {
            return invalid("store.database_path must not be empty");
        }
        if self.store.pool_size == 0 {
            return invalid("store.pool_size must be greater than 0");
        }
        if self.session.ttl.is_zero() {
            return invalid("session.ttl must be greater than 0");
        }

        self.logging
            .level
            .parse::<LogLevel>()
            .map_err(|e| ConfigError::Invalid(format!("logging.level: {}", e)))?;

        Ok(())
    }

    /// Write the configuration as TOML
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
