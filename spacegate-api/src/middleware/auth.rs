//! Bearer-token session resolution.
//!
//! `resolve_session` attaches the caller's [`Session`] to the request when a
//! valid token is present and lets every request through; handlers decide
//! what an anonymous caller gets. `require_session` rejects anonymous
//! requests outright.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;

/// Extracts the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Attach a [`Session`] extension when the token is valid
pub async fn resolve_session(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer_token(req.headers()) {
        match state.sessions.get_session(&token).await {
            Ok(session) => {
                req.extensions_mut().insert(session);
            }
            Err(_) => debug!("ignoring unknown or expired session token"),
        }
    }

    next.run(req).await
}

/// Reject requests that carry no valid session
pub async fn require_session(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    if req.extensions().get::<Session>().is_none() {
        return Err(ApiError::InvalidSession);
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn extract_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_bearer_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn extract_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc123"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn extract_token_without_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
