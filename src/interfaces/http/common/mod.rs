//! Response envelope, error boundary and request extractors shared by
//! every handler.

pub mod cookies;
mod error;
mod validated_json;

use serde::Serialize;
use utoipa::ToSchema;

pub use error::ApiError;
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// `{success, data}` on success, `{success: false, error}` on failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// `{success, count, data}` for plain (non-paginated) lists.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Serialises as `{}`
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct EmptyData {}
