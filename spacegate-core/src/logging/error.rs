//! Logging setup errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}' (expected trace, debug, info, warn or error)")]
    UnknownLevel(String),

    /// A global subscriber was installed earlier in this process
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_lists_choices() {
        let msg = LoggingError::UnknownLevel("loud".to_string()).to_string();
        assert!(msg.contains("'loud'"));
        assert!(msg.contains("trace, debug, info, warn or error"));
    }
}
