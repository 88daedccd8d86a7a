//! Integration tests for edupath-api HTTP endpoints
//!
//! Drives the full router with stubbed identity and prediction backends
//! against a temporary SQLite database.

mod common;

use axum::http::StatusCode;
use common::*;
use edupath_common::db::{users, weights};
use edupath_common::fields::labels_for;
use serde_json::json;
use tower::util::ServiceExt;

async fn set_user_weights(app: &TestApp, user_id: i64, weights: &[(usize, f64)]) {
    for index in 0..edupath_common::FIELD_COUNT {
        let value = weights
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, w)| *w)
            .unwrap_or(0.0);
        sqlx::query(
            "INSERT OR REPLACE INTO user_topic_weights (user_id, field_index, weight) \
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(index as i64)
        .bind(value)
        .execute(app.db())
        .await
        .unwrap();
    }
}

async fn user_id(app: &TestApp, uid: &str) -> i64 {
    users::find_user_by_uid(app.db(), uid).await.unwrap().unwrap().id
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup().await;

    let (status, body) = app.send(empty_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "edupath-api");
    assert_eq!(body["database"], "ok");
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_access_token_creates_user_once() {
    let app = setup().await;

    let (status, body) = app
        .send(json_request("POST", "/auth/access-token", None, json!({"token": "id-token-alice"})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert_eq!(body["data"]["user"]["is_active"], true);
    let first_id = body["data"]["user"]["id"].as_i64().unwrap();

    let (_, again) = app
        .send(json_request("POST", "/auth/access-token", None, json!({"token": "id-token-alice"})))
        .await;
    assert_eq!(again["data"]["user"]["id"].as_i64().unwrap(), first_id);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_access_token_rejects_unknown_id_token() {
    let app = setup().await;

    let (status, body) = app
        .send(json_request("POST", "/auth/access-token", None, json!({"token": "forged"})))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIAL");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_me_returns_session_user() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app.send(empty_request("POST", "/auth/me", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["uid"], "uid-alice");
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app
        .send(json_request("POST", "/auth/logout", None, json!({"token": token})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User logged out");
    assert!(body["data"].is_null());
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_save_user_then_get_me_resolves_school() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/users/save-user",
            Some(&token),
            json!({"first_name": "Alice", "school_id": 1, "school_major_id": 1}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Alice");

    // Absent fields are kept
    app.send(json_request("POST", "/users/save-user", Some(&token), json!({"gender": "F"})))
        .await;

    let (status, body) = app.send(empty_request("GET", "/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["first_name"], "Alice");
    assert_eq!(body["data"]["user"]["gender"], "F");
    assert_eq!(body["data"]["school"]["school_name"], "SMA Negeri 1 Jakarta");
    assert_eq!(body["data"]["school_major"]["school_major_name"], "IPA");
}

#[tokio::test]
async fn test_save_user_unknown_school_is_not_found() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, _) = app
        .send(json_request("POST", "/users/save-user", Some(&token), json!({"school_id": 42})))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_field_recommendation_top_three() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;
    let id = user_id(&app, "uid-alice").await;
    set_user_weights(&app, id, &[(2, 5.0), (7, 9.0), (11, 5.0)]).await;

    let (status, body) = app
        .send(empty_request("GET", "/users/field-recommendation", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::OK);
    let expected = labels_for(&[7, 2, 11]);
    assert_eq!(body["data"]["top_topics"], json!(expected));
}

#[tokio::test]
async fn test_field_recommendation_without_weights() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app
        .send(empty_request("GET", "/users/field-recommendation", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");
}

// =============================================================================
// Topics and ratings
// =============================================================================

#[tokio::test]
async fn test_get_topic_includes_weight() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app.send(empty_request("GET", "/topics/2", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["topic_name"], "Topic 2");
    assert_eq!(body["data"]["topic_weight"][5], 1.0);

    let (status, body) = app.send(empty_request("GET", "/topics/99", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_rating_accumulates_weights() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;
    let id = user_id(&app, "uid-alice").await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/topics/user-topic-rating",
            Some(&token),
            json!({"topic_id": 1, "rating": 3}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user_id"].as_i64().unwrap(), id);
    assert_eq!(body["data"]["rating"], 3);

    app.send(json_request(
        "POST",
        "/topics/user-topic-rating",
        Some(&token),
        json!({"topic_id": 2, "rating": 4}),
    ))
    .await;

    let v = weights::load_user_weight(app.db(), id).await.unwrap().unwrap();
    assert_eq!(v.as_slice()[0], 3.0);
    assert_eq!(v.as_slice()[5], 4.0);
    assert_eq!(v.as_slice().iter().sum::<f64>(), 7.0);
}

#[tokio::test]
async fn test_rating_on_topic_without_weight_is_recorded() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;
    let id = user_id(&app, "uid-alice").await;

    let (status, _) = app
        .send(json_request(
            "POST",
            "/topics/user-topic-rating",
            Some(&token),
            json!({"topic_id": 3, "rating": 5}),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(weights::load_user_weight(app.db(), id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rating_validation() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    for rating in [0, 6, -1] {
        let (status, body) = app
            .send(json_request(
                "POST",
                "/topics/user-topic-rating",
                Some(&token),
                json!({"topic_id": 1, "rating": rating}),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {}", rating);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    let (status, _) = app
        .send(json_request(
            "POST",
            "/topics/user-topic-rating",
            Some(&token),
            json!({"topic_id": 99, "rating": 3}),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_topic_rating")
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_malformed_rating_body_uses_error_envelope() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    for body in [json!({"rating": "5", "topic_id": 1}), json!({"topic_id": 1}), json!([])] {
        let (status, response) = app
            .send(json_request("POST", "/topics/user-topic-rating", Some(&token), body.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(response["code"], "INVALID_INPUT");
        assert!(response["data"].is_null());
        assert!(response["message"].is_string());
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_topic_rating")
        .fetch_one(app.db())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_non_numeric_path_id_uses_error_envelope() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    for uri in ["/topics/abc", "/topics/user-topic-rating/1.5"] {
        let (status, body) = app.send(empty_request("GET", uri, Some(&token))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert_eq!(body["code"], "INVALID_INPUT");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ratings_all_accumulate() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;
    let id = user_id(&app, "uid-alice").await;

    let mut handles = Vec::new();
    for _ in 0..5 {
        let router = app.router();
        let request = json_request(
            "POST",
            "/topics/user-topic-rating",
            Some(&token),
            json!({"topic_id": 1, "rating": 2}),
        );
        handles.push(tokio::spawn(async move {
            router.oneshot(request).await.unwrap().status()
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let v = weights::load_user_weight(app.db(), id).await.unwrap().unwrap();
    assert_eq!(v.as_slice()[0], 10.0);
}

#[tokio::test]
async fn test_rating_history_and_lookup() {
    let app = setup().await;
    let alice = app.login("id-token-alice").await;
    let bob = app.login("id-token-bob").await;

    for (topic_id, rating) in [(1, 4), (2, 2)] {
        app.send(json_request(
            "POST",
            "/topics/user-topic-rating",
            Some(&alice),
            json!({"topic_id": topic_id, "rating": rating}),
        ))
        .await;
    }
    let (_, bob_rating) = app
        .send(json_request(
            "POST",
            "/topics/user-topic-rating",
            Some(&bob),
            json!({"topic_id": 1, "rating": 1}),
        ))
        .await;

    let (status, body) = app
        .send(empty_request("GET", "/topics/user-topic-rating/user-history", Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let history = body["data"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["topic_id"], 1);
    assert_eq!(history[1]["topic_id"], 2);

    let own_id = history[0]["id"].as_i64().unwrap();
    let (status, body) = app
        .send(empty_request("GET", &format!("/topics/user-topic-rating/{}", own_id), Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rating"], 4);

    let bob_id = bob_rating["data"]["id"].as_i64().unwrap();
    let (status, _) = app
        .send(empty_request("GET", &format!("/topics/user-topic-rating/{}", bob_id), Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(empty_request("GET", "/topics/user-topic-rating/9999", Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_history() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app
        .send(empty_request("GET", "/topics/user-topic-rating/user-history", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_numeric_model_without_weights_skips_predictor() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;

    let (status, body) = app
        .send(empty_request("POST", "/predict/numeric-model", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_STATE");
    assert_eq!(app.predictor.call_count(), 0);
}

#[tokio::test]
async fn test_numeric_model_ranks_reference_items() {
    let app = setup().await;
    let token = app.login("id-token-alice").await;
    app.send(json_request(
        "POST",
        "/topics/user-topic-rating",
        Some(&token),
        json!({"topic_id": 1, "rating": 5}),
    ))
    .await;

    let (status, body) = app
        .send(empty_request("POST", "/predict/numeric-model", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::OK);
    // Prediction [0.9, 0.1, 0.0] against the four reference rows
    assert_eq!(
        body["data"],
        json!(["Teknik Informatika", "Sastra Inggris", "Kedokteran", "Hukum"])
    );
    assert_eq!(app.predictor.call_count(), 1);
}

#[tokio::test]
async fn test_numeric_model_sends_stored_user_weight() {
    let app = setup().await;
    let alice = app.login("id-token-alice").await;
    let bob = app.login("id-token-bob").await;
    app.send(json_request(
        "POST",
        "/topics/user-topic-rating",
        Some(&alice),
        json!({"topic_id": 1, "rating": 5}),
    ))
    .await;
    app.send(json_request(
        "POST",
        "/topics/user-topic-rating",
        Some(&bob),
        json!({"topic_id": 2, "rating": 2}),
    ))
    .await;

    let (status, _) = app
        .send(empty_request("POST", "/predict/numeric-model", Some(&alice)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = vec![0.0; edupath_common::FIELD_COUNT];
    expected[0] = 5.0;
    let id = user_id(&app, "uid-alice").await;
    let stored = weights::load_user_weight(app.db(), id).await.unwrap().unwrap();
    assert_eq!(stored.as_slice(), expected.as_slice());
    assert_eq!(app.predictor.received_features(), vec![expected]);
}

#[tokio::test]
async fn test_numeric_model_dimension_mismatch_is_server_error() {
    let app = setup_with(vec![1.0, 0.0], default_embedding()).await;
    let token = app.login("id-token-alice").await;
    let id = user_id(&app, "uid-alice").await;
    set_user_weights(&app, id, &[(0, 1.0)]).await;

    let (status, body) = app
        .send(empty_request("POST", "/predict/numeric-model", Some(&token)))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "SERVICE_ERROR");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_quick_recommendation_is_public() {
    let app = setup().await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/predict/quick-recommendation",
            None,
            json!({"text": "Saya suka merakit robot"}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["prediction"], json!(labels_for(&[16, 3, 7, 0, 12])));
}

#[tokio::test]
async fn test_quick_recommendation_rejects_wrong_embedding_size() {
    let app = setup_with(vec![0.9, 0.1, 0.0], vec![0.5; 8]).await;

    let (status, body) = app
        .send(json_request("POST", "/predict/quick-recommendation", None, json!({"text": "robot"})))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "SERVICE_ERROR");
}

#[tokio::test]
async fn test_quick_recommendation_bad_body_uses_error_envelope() {
    let app = setup().await;

    let (status, body) = app
        .send(json_request("POST", "/predict/quick-recommendation", None, json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["data"].is_null());

    // No content type at all
    let (status, body) = app
        .send(empty_request("POST", "/predict/quick-recommendation", None))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.predictor.call_count(), 0);
}
