use thiserror::Error;

/// Errors raised by domain rules, services and storage adapters.
///
/// The HTTP layer maps every variant to a status code in one place
/// (`interfaces::http::common::ApiError`).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("{0}")]
    Upload(String),
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// True for failures the client cannot fix by changing the request.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Upload(_))
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        let message = e.to_string();
        if message.contains("UNIQUE") || message.contains("duplicate") {
            DomainError::Conflict("Duplicate value is provided".to_string())
        } else {
            DomainError::Storage(message)
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Storage(format!("Serialization error: {}", e))
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Storage(format!("Geocoder request failed: {}", e))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(_: std::io::Error) -> Self {
        DomainError::Upload("Problem with file upload".to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
