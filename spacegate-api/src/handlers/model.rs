//! Model Gateway endpoints: `/api/model/:model/:operation`
//!
//! Payloads are handed over undecoded, extractor failures included; the
//! gateway reports them only once the caller is authenticated.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;
use spacegate_core::gateway::{DataEnvelope, GatewayError, GatewayRequest, Payload};

use crate::error::ApiResult;
use crate::session::Session;
use crate::state::AppState;
use crate::types::ReadQuery;

/// GET - reads, payload in `?q=<json>`
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path((model, operation)): Path<(String, String)>,
    session: Option<Extension<Session>>,
    query: Result<Query<ReadQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let payload = match query {
        Ok(Query(ReadQuery { q: Some(q) })) => Payload::Raw(q.into_bytes()),
        Ok(Query(ReadQuery { q: None })) => Payload::Json(Value::Null),
        Err(rejection) => Payload::Rejected(GatewayError::InvalidPayload(rejection.body_text())),
    };

    dispatch(
        &state,
        session,
        GatewayRequest::read(model, operation, payload),
    )
    .await
}

/// POST - mutations, payload in the JSON body
pub async fn mutate(
    State(state): State<Arc<AppState>>,
    Path((model, operation)): Path<(String, String)>,
    session: Option<Extension<Session>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let payload = match body {
        Ok(body) => Payload::Raw(body.to_vec()),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Payload::Rejected(GatewayError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => Payload::Rejected(GatewayError::InvalidPayload(rejection.body_text())),
    };

    dispatch(
        &state,
        session,
        GatewayRequest::mutation(model, operation, payload),
    )
    .await
}

async fn dispatch(
    state: &AppState,
    session: Option<Extension<Session>>,
    request: GatewayRequest,
) -> ApiResult<Response> {
    let identity = session.as_ref().map(|Extension(s)| &s.user_id);
    let response = state.gateway.dispatch(identity, request).await?;

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(DataEnvelope { data: response.data })).into_response())
}
