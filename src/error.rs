//! Error types for the cache
//!
//! Remote tier failures never reach callers of the cache service; they are
//! absorbed and logged inside the remote tier. `ApiError` covers the operator
//! HTTP surface only.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Remote Error Enum ==
/// Failure of a single remote tier call.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Connection, authentication or protocol failure
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Value not representable in the wire format
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Call exceeded the configured remote timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

// == Api Error Enum ==
/// Error type for the operator HTTP API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key not found in either tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
