//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value. Both
//! malformed JSON and failed validation answer 400.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::ApiResponse;

/// ```ignore
/// async fn handler(ValidatedJson(body): ValidatedJson<CreateCourseRequest>) {
///     // `body` passed validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

/// Field messages joined in field order.
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join(", ")
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let message = match self {
            Self::JsonError(rejection) => format!("Invalid JSON: {}", rejection.body_text()),
            Self::ValidationError(errors) => validation_message(&errors),
        };
        (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 1, message = "Course title is required."))]
        title: String,
        #[validate(range(min = 0.0, message = "Tuition cannot be negative."))]
        tuition: f64,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    async fn send(body: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/test", post(handler));
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let (status, _) = send(r#"{"title": "Front End", "tuition": 8000}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400() {
        let (status, body) = send("not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn validation_failure_joins_messages() {
        let (status, body) = send(r#"{"title": "", "tuition": -1}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Course title is required., Tuition cannot be negative."
        );
    }
}
