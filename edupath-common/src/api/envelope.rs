//! Response envelope
//!
//! Every EduPath endpoint answers `{ "message": ..., "data": ... }`.

use serde::{Deserialize, Serialize};

/// Generic `{message, data}` wrapper
///
/// # Examples
///
/// ```
/// use edupath_common::api::ApiResponse;
///
/// let ok = ApiResponse::success(vec![1, 2, 3], "success");
/// assert_eq!(ok.data, Some(vec![1, 2, 3]));
///
/// let err = ApiResponse::<()>::error("Topic not found");
/// assert!(err.data.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Success with payload
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    /// Failure with message only
    pub fn error(message: impl Into<String>) -> Self {
        Self::message(message)
    }

    /// Acknowledgement without payload (e.g. logout)
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}
