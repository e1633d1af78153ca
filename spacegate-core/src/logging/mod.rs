//! Logging subsystem for SpaceGate
//!
//! Thin wrapper over `tracing-subscriber`. `RUST_LOG` always wins over the
//! configured level so operators can raise verbosity per module.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

/// Subscriber settings, built from `LoggingConfig` or CLI flags
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Used when `RUST_LOG` is unset
    pub level: LogLevel,
    pub with_timestamp: bool,
    /// Print the event's module path
    pub with_target: bool,
    /// One JSON object per line instead of the human format
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamp: true,
            with_target: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.with_timestamp = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = LoggingError;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        Ok(LogConfig::new(config.level.parse()?)
            .with_timestamp(config.with_timestamp)
            .with_target(config.with_target)
            .json_format(config.json_format))
    }
}

/// Human-readable output at `info`
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Install the global subscriber; fails if one is already set
///
/// # Example
/// ```
/// use spacegate_core::logging::{init_logging_with_config, LogConfig, LogLevel};
///
/// let config = LogConfig::new(LogLevel::Debug)
///     .with_timestamp(true)
///     .with_target(false);
///
/// init_logging_with_config(config).expect("first subscriber in this process");
/// ```
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);
    let target = config.with_target;

    let result = match (config.json_format, config.with_timestamp) {
        (true, true) => registry.with(fmt::layer().json().with_target(target)).try_init(),
        (true, false) => registry
            .with(fmt::layer().json().without_time().with_target(target))
            .try_init(),
        (false, true) => registry.with(fmt::layer().with_target(target)).try_init(),
        (false, false) => registry
            .with(fmt::layer().without_time().with_target(target))
            .try_init(),
    };

    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.with_timestamp);
        assert!(config.with_target);
        assert!(!config.json_format);
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new(LogLevel::Debug)
            .with_timestamp(false)
            .with_target(false)
            .json_format(true);

        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.with_timestamp);
        assert!(!config.with_target);
        assert!(config.json_format);
    }

    #[test]
    fn test_log_config_from_app_config() {
        let app = LoggingConfig {
            level: "warn".to_string(),
            json_format: true,
            with_timestamp: false,
            with_target: true,
        };

        let config = LogConfig::try_from(&app).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert!(config.json_format);
        assert!(!config.with_timestamp);
    }

    #[test]
    fn test_log_config_rejects_unknown_level() {
        let app = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            LogConfig::try_from(&app),
            Err(LoggingError::UnknownLevel(ref level)) if level == "loud"
        ));
    }
}
