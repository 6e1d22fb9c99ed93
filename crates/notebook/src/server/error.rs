//! Error responses for the HTTP transport.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::Error;

/// Body of every error response.
///
/// ```json
/// { "error": "<code>", "message": "<detail>", "timestamp": 1700000000000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code, see [`Error::code`].
    pub error: String,
    /// Human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
    /// When the error was produced, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ErrorResponse {
    /// Build a response stamped with the current time.
    #[must_use]
    pub fn new(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            error: error.into(),
            message,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Wire code for a request body that could not be read as the expected JSON.
pub const CODE_INVALID_REQUEST: &str = "invalid_request";

/// An [`Error`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// A body that axum refused to decode. Keeps axum's status (400, 415 or
    /// 422) and its explanation.
    #[must_use]
    pub fn from_rejection(rejection: &JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            body: ErrorResponse::new(CODE_INVALID_REQUEST, Some(rejection.body_text())),
        }
    }

    /// The status code that will be sent.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The body that will be sent.
    #[must_use]
    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::InvalidIdentifier { .. } | Error::InvalidNote { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Unhandled error: {}", err);
        }
        Self {
            status,
            body: ErrorResponse::new(err.code(), Some(err.detail())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
