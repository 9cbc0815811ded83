//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::interfaces::http::state::ApiState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Storage is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<ApiState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, http_status) = match state.repos.users().count_users().await {
        Ok(_) => ("ok", StatusCode::OK),
        Err(e) => {
            warn!(error = %e, "Health check storage probe failed");
            ("degraded", StatusCode::SERVICE_UNAVAILABLE)
        }
    };

    (
        http_status,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
        }),
    )
}
