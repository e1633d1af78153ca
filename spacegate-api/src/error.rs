use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use spacegate_core::core_space::DataError;
use spacegate_core::gateway::{ErrorBody, GatewayError};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid session token")]
    InvalidSession,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Username already taken")]
    UsernameTaken,

    /// The request body could not be extracted
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let code = match self {
            ApiError::AuthenticationFailed(_) | ApiError::InvalidSession => 401,
            ApiError::BadRequest(_) => 400,
            ApiError::UsernameTaken => 409,
            ApiError::Rejected { status, .. } => status.as_u16(),
            ApiError::Gateway(err) => err.status_code(),
            ApiError::Data(err) => err.kind.http_status(),
            ApiError::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Gateway(err) => err.to_body(),
            ApiError::Data(err) => ErrorBody::data(err),
            // Details stay in the log
            ApiError::Internal(_) => ErrorBody::plain("Internal error"),
            other => ErrorBody::plain(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "request failed: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
