//! Topic detail and topic ratings

use axum::{extract::State, http::StatusCode, Extension, Json};
use edupath_common::api::{ApiResponse, RatingRequest};
use edupath_common::db::models::{Topic, UserTopicRating};
use edupath_common::db::{ratings, topics};
use edupath_common::Error;

use crate::accumulator;
use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::{JsonBody, PathParam};
use crate::AppState;

/// GET /topics/:id
pub async fn get_topic(
    State(state): State<AppState>,
    PathParam(topic_id): PathParam<i64>,
) -> ApiResult<Json<ApiResponse<Topic>>> {
    let topic = topics::get_topic(&state.db, topic_id).await?;
    Ok(Json(ApiResponse::success(topic, "success")))
}

/// POST /topics/user-topic-rating
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    JsonBody(request): JsonBody<RatingRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<UserTopicRating>>)> {
    let record =
        accumulator::record_rating(&state.db, user.id, request.topic_id, request.rating).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record, "success"))))
}

/// GET /topics/user-topic-rating/user-history
pub async fn rating_history(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ApiResponse<Vec<UserTopicRating>>>> {
    let history = ratings::list_ratings_for_user(&state.db, user.id).await?;
    Ok(Json(ApiResponse::success(history, "success")))
}

/// GET /topics/user-topic-rating/:id
///
/// Ratings of other users are reported as not found.
pub async fn get_rating(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    PathParam(rating_id): PathParam<i64>,
) -> ApiResult<Json<ApiResponse<UserTopicRating>>> {
    let record = ratings::get_rating(&state.db, rating_id).await?;
    if record.user_id != user.id {
        return Err(Error::NotFound("UserTopicRating not found".to_string()).into());
    }
    Ok(Json(ApiResponse::success(record, "success")))
}
