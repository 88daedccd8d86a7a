//! Access token exchange, logout and session introspection

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use edupath_common::api::{AccessTokenRequest, ApiResponse, LogoutRequest, TokenResponse};
use edupath_common::db::models::User;
use edupath_common::db::{revoked, users};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::AppState;

/// POST /auth/access-token
///
/// Verifies the identity provider's ID token, creates the local user on first
/// login, and issues a session token.
pub async fn access_token(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<AccessTokenRequest>,
) -> ApiResult<Json<ApiResponse<TokenResponse>>> {
    let identity = state.identity.verify(&request.token).await?;
    let user = users::get_or_create_user(&state.db, &identity.subject, &identity.email).await?;

    // The stored uid wins so the session resolves back to this row
    let subject = user.uid.clone().unwrap_or(identity.subject);
    let token = state.sessions.issue(&subject)?;

    info!(user_id = user.id, "Session issued");
    Ok(Json(ApiResponse::success(TokenResponse::bearer(token, user), "success")))
}

/// POST /auth/logout
///
/// Revokes a session token for the rest of its lifetime.
pub async fn logout(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LogoutRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let claims = state.sessions.decode(&request.token)?;
    revoked::revoke_token(&state.db, &request.token, claims.exp, Utc::now().timestamp()).await?;

    Ok(Json(ApiResponse::message("User logged out")))
}

/// POST /auth/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<ApiResponse<User>> {
    Json(ApiResponse::success(user, "success"))
}
