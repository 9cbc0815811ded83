//! Process-wide error boundary: every `DomainError` becomes
//! `{success: false, error}` with its status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::ApiResponse;
use crate::shared::DomainError;

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) | DomainError::Conflict(_) => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Storage(_) | DomainError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            DomainError::Conflict(_) => "Duplicate value is provided".to_string(),
            // Storage details stay in the logs.
            DomainError::Storage(_) => "Server Error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_mapping() {
        let cases = [
            (DomainError::not_found("x"), StatusCode::NOT_FOUND),
            (DomainError::validation("x"), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("x"), StatusCode::FORBIDDEN),
            (DomainError::Storage("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::Upload("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn error_body_shape() {
        let response = ApiError(DomainError::not_found("Bootcamp not found with provided id"))
            .into_response();
        assert_eq!(
            body_of(response).await,
            serde_json::json!({ "success": false, "error": "Bootcamp not found with provided id" })
        );
    }

    #[tokio::test]
    async fn conflict_uses_duplicate_message() {
        let response = ApiError(DomainError::Conflict("UNIQUE constraint failed".into())).into_response();
        assert_eq!(body_of(response).await["error"], "Duplicate value is provided");
    }
}
