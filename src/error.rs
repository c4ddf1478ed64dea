//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Persistence Error Enum ==
/// Failure reading or writing a persisted snapshot.
///
/// Never escapes the cache; it is logged and dropped at the call site.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Underlying storage failed
    #[error("Storage I/O failed for '{namespace}': {source}")]
    Io {
        namespace: String,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Cache Error Enum ==
/// Errors surfaced by the HTTP host.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP host.
pub type Result<T> = std::result::Result<T, CacheError>;
