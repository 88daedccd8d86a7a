//! Shared API request/response types

use serde::{Deserialize, Serialize};

use crate::db::models::{School, SchoolMajor, User};

// ========================================
// Access Control
// ========================================

/// Body of `POST /auth/access-token`: the identity provider's ID token
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessTokenRequest {
    pub token: String,
}

/// Body of `POST /auth/logout`: the session token to revoke
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogoutRequest {
    pub token: String,
}

/// Issued session token plus the resolved local user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user: User) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user,
        }
    }
}

// ========================================
// Users
// ========================================

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub school_id: Option<i64>,
    pub school_major_id: Option<i64>,
}

/// User with resolved school and school major
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSchoolDetail {
    pub user: User,
    pub school: Option<School>,
    pub school_major: Option<SchoolMajor>,
}

/// Top subject fields of a user's preference vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSummary {
    pub top_topics: Vec<String>,
}

// ========================================
// Ratings & Predictions
// ========================================

/// Body of `POST /topics/user-topic-rating`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatingRequest {
    pub rating: i64,
    pub topic_id: i64,
}

/// Body of `POST /predict/quick-recommendation`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextPredictionRequest {
    pub text: String,
}

/// Payload of `POST /predict/quick-recommendation`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPredictionResponse {
    pub prediction: Vec<String>,
}
