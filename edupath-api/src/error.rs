//! HTTP error mapping
//!
//! Every failure is answered with the `{message, data: null}` envelope plus a
//! machine-oriented `code`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use edupath_common::api::ApiResponse;
use edupath_common::Error;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authenticated but not allowed (403), e.g. inactive user
    #[error("{0}")]
    Forbidden(String),

    /// Request body over the configured limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Domain or infrastructure error from edupath-common
    #[error(transparent)]
    Common(#[from] Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Common(err) => match err {
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::InvalidCredential(_) => StatusCode::UNAUTHORIZED,
                Error::InvalidState(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
                Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                Error::Service(_)
                | Error::Database(_)
                | Error::Io(_)
                | Error::Config(_)
                | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::Common(err) => err.code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            ApiError::Forbidden(msg) | ApiError::PayloadTooLarge(msg) => msg.clone(),
            ApiError::Common(Error::NotFound(msg))
            | ApiError::Common(Error::InvalidCredential(msg))
            | ApiError::Common(Error::InvalidState(msg))
            | ApiError::Common(Error::InvalidInput(msg))
            | ApiError::Common(Error::Service(msg))
            | ApiError::Common(Error::Timeout(msg)) => msg.clone(),
            // Infrastructure details stay in the log
            ApiError::Common(_) => "Internal server error".to_string(),
        };

        if status.is_server_error() {
            error!(code, status = status.as_u16(), error = %self, "Request failed");
        }

        let body = Json(ErrorBody {
            envelope: ApiResponse::error(message),
            code,
        });
        (status, body).into_response()
    }
}

/// Envelope plus the machine-oriented error code
#[derive(Serialize)]
struct ErrorBody {
    #[serde(flatten)]
    envelope: ApiResponse<()>,
    code: &'static str,
}

/// Malformed, mistyped or oversized JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge("Request body too large".to_string());
        }
        ApiError::Common(Error::InvalidInput(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Common(Error::InvalidInput(rejection.body_text()))
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
