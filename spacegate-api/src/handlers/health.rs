//! GET /health

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use spacegate_core::health::{checks, HealthCheck};

use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthCheck>) {
    let database = checks::check_database(state.gateway.store()).await;
    state.health.report(database).await;

    let report = state.health.check_health().await;
    let status = StatusCode::from_u16(report.status.to_http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(report))
}
