//! Signup, login and session endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use crate::error::ApiResult;
use crate::session::Session;
use crate::state::AppState;
use crate::types::{CredentialsRequest, SessionResponse};

/// POST /api/auth/signup - Register and sign in
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let Json(req) = payload?;
    let user = state.users.create_user(&req.username, &req.password).await?;
    let session = state.sessions.create_session(&user).await;
    info!(user_id = %user.id, "user signed up");

    Ok((StatusCode::CREATED, Json(SessionResponse::new(&session))))
}

/// POST /api/auth/login - Exchange credentials for a session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<SessionResponse>> {
    let Json(req) = payload?;
    let user = state.users.verify(&req.username, &req.password).await?;
    let session = state.sessions.create_session(&user).await;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(SessionResponse::new(&session)))
}

/// POST /api/auth/logout - Drop the current session
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> ApiResult<StatusCode> {
    state.sessions.remove_session(&session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/session - Current session
pub async fn current_session(
    Extension(session): Extension<Session>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(SessionResponse::new(&session)))
}
