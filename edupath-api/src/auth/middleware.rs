//! Session authentication middleware
//!
//! Applied to protected routes only; `/health`, `/auth/access-token`,
//! `/auth/logout` and `/predict/quick-recommendation` do not use it.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use edupath_common::db::models::User;
use edupath_common::db::{revoked, users};
use edupath_common::Error;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Authenticated user, inserted as a request extension
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extract the bearer credential from `Authorization`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, Error> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::InvalidCredential("Not authenticated".to_string()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| Error::InvalidCredential("Not authenticated".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(Error::InvalidCredential("Not authenticated".to_string()));
    }

    Ok(token.trim())
}

/// Resolve the session token to an active local user
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())?.to_string();

    let claims = state.sessions.decode(&token)?;

    if revoked::is_token_revoked(&state.db, &token, Utc::now().timestamp()).await? {
        debug!("Rejected revoked session token");
        return Err(Error::InvalidCredential("Token has been revoked".to_string()).into());
    }

    let user = users::find_user_by_uid(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", claims.sub)))?;

    if !user.is_active {
        return Err(ApiError::Forbidden("Inactive user".to_string()));
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
