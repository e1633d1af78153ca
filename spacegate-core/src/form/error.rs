//! Form error types
//!
//! `CreateSpaceError` is decided where a response is received, so the form
//! only ever matches on variants.

use super::state::FormState;
use crate::core_space::{DataError, DataErrorKind, ValidationError};
use crate::gateway::{ErrorBody, GatewayError};
use serde_json::json;
use thiserror::Error;

/// Why a create request failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateSpaceError {
    /// The slug is taken
    #[error("Space slug already in use")]
    Uniqueness,

    /// Any other data-layer failure, by code
    #[error("Unexpected data error: {code}")]
    Other { code: String },

    /// A failure without a data-layer classification, serialized as-is
    #[error("{0}")]
    Unknown(String),
}

impl CreateSpaceError {
    /// Classify a gateway error body
    pub fn from_error_body(body: &ErrorBody) -> Self {
        if !body.info.data_layer {
            return CreateSpaceError::Unknown(dump(body));
        }

        match body.info.code.as_deref() {
            Some(code) if DataErrorKind::from_code(code) == Some(DataErrorKind::Uniqueness) => {
                CreateSpaceError::Uniqueness
            }
            Some(code) => CreateSpaceError::Other {
                code: code.to_string(),
            },
            None => CreateSpaceError::Unknown(dump(body)),
        }
    }

    /// Classify a raw HTTP error response
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self::from_error_body(&parsed),
            Err(_) => CreateSpaceError::Unknown(json!({ "status": status, "body": body }).to_string()),
        }
    }

    /// Text for the error notification
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

fn dump(body: &ErrorBody) -> String {
    serde_json::to_string(body).unwrap_or_else(|_| body.message.clone())
}

impl From<DataError> for CreateSpaceError {
    fn from(err: DataError) -> Self {
        if err.is_uniqueness() {
            CreateSpaceError::Uniqueness
        } else {
            CreateSpaceError::Other {
                code: err.code().to_string(),
            }
        }
    }
}

impl From<GatewayError> for CreateSpaceError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Data(data) => data.into(),
            other => CreateSpaceError::Unknown(dump(&other.to_body())),
        }
    }
}

/// Misuse of the form itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Cannot {action} while the form is {state:?}")]
    InvalidState {
        action: &'static str,
        state: FormState,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_space::DataErrorKind;

    #[test]
    fn test_uniqueness_message() {
        let err = CreateSpaceError::from(DataError::new(DataErrorKind::Uniqueness, "dup"));
        assert_eq!(err, CreateSpaceError::Uniqueness);
        assert_eq!(err.user_message(), "Space slug already in use");
    }

    #[test]
    fn test_other_code_message() {
        let err = CreateSpaceError::from(DataError::policy_denied("nope"));
        assert_eq!(err.user_message(), "Unexpected data error: P2004");
    }

    #[test]
    fn test_from_error_body() {
        let body = ErrorBody::data(&DataError::new(DataErrorKind::Uniqueness, "dup"));
        assert_eq!(CreateSpaceError::from_error_body(&body), CreateSpaceError::Uniqueness);

        let body = ErrorBody::plain("Unauthorized");
        match CreateSpaceError::from_error_body(&body) {
            CreateSpaceError::Unknown(raw) => {
                assert!(raw.contains("Unauthorized"));
                assert!(raw.contains("\"prisma\":false"));
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_from_unparseable_response() {
        let err = CreateSpaceError::from_response(502, "<html>bad gateway</html>");
        match err {
            CreateSpaceError::Unknown(raw) => {
                assert!(raw.contains("502"));
                assert!(raw.contains("bad gateway"));
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_gateway_error_conversion() {
        let err = CreateSpaceError::from(GatewayError::Unauthenticated);
        assert!(matches!(err, CreateSpaceError::Unknown(_)));

        let err = CreateSpaceError::from(GatewayError::Data(DataError::not_found("Space")));
        assert_eq!(
            err,
            CreateSpaceError::Other {
                code: "P2025".to_string()
            }
        );
    }
}
