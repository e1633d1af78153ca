//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An environment override that does not parse
    #[error("{key}={value:?}: {reason}")]
    Env {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn env(key: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Env {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
