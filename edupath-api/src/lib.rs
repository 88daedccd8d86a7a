//! edupath-api library - career guidance backend
//!
//! Topic ratings accumulate into a per-user field weight vector, which drives
//! major and field recommendations through a hosted prediction model.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod accumulator;
pub mod api;
pub mod auth;
pub mod error;
pub mod extract;
pub mod gateway;

/// Request bodies are small JSON documents
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

use auth::{IdentityVerifier, SessionIssuer};
use gateway::RecommendationGateway;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: Arc<SessionIssuer>,
    pub identity: Arc<dyn IdentityVerifier>,
    pub gateway: Arc<RecommendationGateway>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        sessions: SessionIssuer,
        identity: Arc<dyn IdentityVerifier>,
        gateway: RecommendationGateway,
    ) -> Self {
        Self {
            db,
            sessions: Arc::new(sessions),
            identity,
            gateway: Arc::new(gateway),
        }
    }
}

/// Build application router
///
/// Health, token exchange, logout and the text recommendation are public;
/// everything else requires a session token.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/auth/me", post(api::auth::me))
        .route("/users/me", get(api::users::get_me))
        .route("/users/save-user", post(api::users::save_user))
        .route("/users/field-recommendation", get(api::users::field_recommendation))
        .route("/topics/:id", get(api::topics::get_topic))
        .route("/topics/user-topic-rating", post(api::topics::create_rating))
        .route("/topics/user-topic-rating/user-history", get(api::topics::rating_history))
        .route("/topics/user-topic-rating/:id", get(api::topics::get_rating))
        .route("/predict/numeric-model", post(api::predict::numeric_model))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    let public = Router::new()
        .route("/auth/access-token", post(api::auth::access_token))
        .route("/auth/logout", post(api::auth::logout))
        .route("/predict/quick-recommendation", post(api::predict::quick_recommendation))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
