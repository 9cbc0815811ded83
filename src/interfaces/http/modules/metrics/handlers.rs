//! `GET /metrics`: Prometheus text exposition of the process recorder

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics_exporter_prometheus::PrometheusHandle;

const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.handle.render(),
    )
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;

    #[tokio::test]
    async fn renders_with_exposition_content_type() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = MetricsState {
            handle: recorder.handle(),
        };

        let response = prometheus_metrics(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            EXPOSITION_CONTENT_TYPE
        );
    }
}
