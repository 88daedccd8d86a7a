//! API module for shared HTTP payload types
//!
//! Contains ONLY framework-independent types. The service wraps these with
//! Axum extractors and `IntoResponse` impls.

pub mod envelope;
pub mod types;

pub use envelope::ApiResponse;
pub use types::{
    AccessTokenRequest, FieldSummary, LogoutRequest, RatingRequest, TextPredictionRequest,
    TextPredictionResponse, TokenResponse, UserProfileUpdate, UserSchoolDetail,
};
