//! Recommendation endpoints

use axum::{extract::State, Extension, Json};
use edupath_common::api::{ApiResponse, TextPredictionRequest, TextPredictionResponse};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::extract::JsonBody;
use crate::AppState;

/// POST /predict/numeric-model
///
/// Top reference items for the caller's accumulated topic weights.
pub async fn numeric_model(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<ApiResponse<Vec<String>>>> {
    let recommendations = state.gateway.recommend_from_weight(&state.db, user.id).await?;
    Ok(Json(ApiResponse::success(recommendations, "success")))
}

/// POST /predict/quick-recommendation
///
/// No authentication: free text in, field labels out.
pub async fn quick_recommendation(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TextPredictionRequest>,
) -> ApiResult<Json<ApiResponse<TextPredictionResponse>>> {
    let prediction = state.gateway.recommend_from_text(&request.text).await?;
    Ok(Json(ApiResponse::success(
        TextPredictionResponse { prediction },
        "success",
    )))
}
