use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::api::state::AppState;
use crate::services::{HealthReport, HealthStatus};

/// GET /health -- refresh state and snapshot size; 503 only when unhealthy
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = HealthReport::collect(&state.roster, state.uptime_seconds()).await;
    let status_code = match report.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(report))
}

/// GET /healthz -- is the process alive?
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}
