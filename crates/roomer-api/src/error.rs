//! API error handling
//!
//! Every error leaves the server as `{"error": <message>}` with the status
//! code carrying the error kind: 400 for validation and upstream failures,
//! 401 for authorization failures, 404 for missing resources.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roomer_core::RoomerError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error envelope returned to clients
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<RoomerError> for AppError {
    fn from(err: RoomerError) -> Self {
        match err {
            RoomerError::NotFound(msg) => AppError::NotFound(msg),
            RoomerError::Unauthorized(msg) => AppError::Unauthorized(msg),
            RoomerError::MissingParameter(msg)
            | RoomerError::InvalidFormat(msg)
            | RoomerError::Conflict(msg)
            | RoomerError::LimitExceeded(msg)
            | RoomerError::Upstream(msg) => AppError::BadRequest(msg),
            RoomerError::Other(err) => AppError::BadRequest(err.to_string()),
        }
    }
}
