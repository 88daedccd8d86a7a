//! Request extractors that reject with the error envelope
//!
//! axum's own `Json` and `Path` answer plain text on failure; these wrap them
//! so a bad body or path parameter becomes `INVALID_INPUT` (or
//! `PAYLOAD_TOO_LARGE`) like every other error.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Typed path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);
