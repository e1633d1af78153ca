//! Gateway error types

use super::wire::ErrorBody;
use crate::core_space::DataError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Operation '{operation}' is not allowed on model '{model}'")]
    OperationNotAllowed {
        model: &'static str,
        operation: String,
    },

    #[error("Operation '{operation}' must be sent with {expected}")]
    WrongMethod {
        operation: &'static str,
        expected: &'static str,
    },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status the server answers with
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Unauthenticated => 401,
            GatewayError::UnknownModel(_) => 404,
            GatewayError::OperationNotAllowed { .. } | GatewayError::WrongMethod { .. } => 405,
            GatewayError::InvalidPayload(_) => 400,
            GatewayError::PayloadTooLarge(_) => 413,
            GatewayError::Data(err) => err.kind.http_status(),
            GatewayError::Internal(_) => 500,
        }
    }

    /// Wire body for this error
    pub fn to_body(&self) -> ErrorBody {
        match self {
            GatewayError::Data(err) => ErrorBody::data(err),
            other => ErrorBody::plain(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::InvalidPayload(err.to_string())
    }
}
