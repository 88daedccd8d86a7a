//! Current-user profile and field summary

use axum::{extract::State, Extension, Json};
use edupath_common::api::{ApiResponse, FieldSummary, UserProfileUpdate, UserSchoolDetail};
use edupath_common::db::models::User;
use edupath_common::db::users;
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::gateway;
use crate::AppState;

/// GET /users/me
///
/// The user with school and school major resolved.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ApiResponse<UserSchoolDetail>>> {
    let school = match user.school_id {
        Some(id) => users::get_school(&state.db, id).await?,
        None => None,
    };
    let school_major = match user.school_major_id {
        Some(id) => users::get_school_major(&state.db, id).await?,
        None => None,
    };

    Ok(Json(ApiResponse::success(
        UserSchoolDetail {
            user,
            school,
            school_major,
        },
        "success",
    )))
}

/// POST /users/save-user
///
/// Partial profile update; fields absent from the body are kept.
pub async fn save_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    JsonBody(update): JsonBody<UserProfileUpdate>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let updated = users::update_profile(&state.db, user.id, &update).await?;
    info!(user_id = user.id, "Profile updated");
    Ok(Json(ApiResponse::success(updated, "success")))
}

/// GET /users/field-recommendation
pub async fn field_recommendation(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ApiResponse<FieldSummary>>> {
    let summary = gateway::field_summary(&state.db, user.id).await?;
    Ok(Json(ApiResponse::success(summary, "success")))
}
