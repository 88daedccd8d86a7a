//! Shared fixtures for edupath-api integration tests
//!
//! External collaborators (identity provider, prediction endpoints) are
//! replaced with in-memory stubs; the database is a temporary SQLite file.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use edupath_api::auth::{ExternalIdentity, IdentityVerifier, SessionIssuer};
use edupath_api::gateway::{PredictionService, RecommendationGateway, ReferenceMatrix};
use edupath_api::{build_router, AppState};
use edupath_common::db::init::init_database;
use edupath_common::db::models::{School, SchoolMajor, Topic};
use edupath_common::db::seed::{seed_reference_data, SeedData};
use edupath_common::{Error, Result, WeightVector, FIELD_COUNT};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

pub const REFERENCE_LABELS: [&str; 4] =
    ["Teknik Informatika", "Kedokteran", "Hukum", "Sastra Inggris"];

/// Identity provider stub: a fixed table of accepted ID tokens
pub struct StubVerifier {
    accepted: HashMap<String, ExternalIdentity>,
}

#[async_trait]
impl IdentityVerifier for StubVerifier {
    async fn verify(&self, raw_token: &str) -> Result<ExternalIdentity> {
        self.accepted
            .get(raw_token)
            .cloned()
            .ok_or_else(|| Error::InvalidCredential("Invalid ID token".to_string()))
    }
}

/// Prediction stub that counts calls and records numeric inputs
pub struct StubPredictor {
    pub prediction: Vec<f64>,
    pub embedding: Vec<f64>,
    pub calls: AtomicUsize,
    pub features: Mutex<Vec<Vec<f64>>>,
}

impl StubPredictor {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Feature vectors passed to `predict`, in call order
    pub fn received_features(&self) -> Vec<Vec<f64>> {
        self.features.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionService for StubPredictor {
    async fn predict(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.features.lock().unwrap().push(features.to_vec());
        Ok(self.prediction.clone())
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.embedding.clone())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub predictor: Arc<StubPredictor>,
    _dir: TempDir,
}

/// Topic whose weight vector is 1.0 at `field` and 0 elsewhere
pub fn unit_topic(id: i64, field: usize) -> Topic {
    let mut components = vec![0.0; FIELD_COUNT];
    components[field] = 1.0;
    Topic {
        id,
        topic_name: Some(format!("Topic {}", id)),
        topic_category_id: None,
        short_introduction: None,
        topic_image: None,
        topic_image2: None,
        topic_explanation: None,
        topic_weight: Some(WeightVector::from_components(components).unwrap()),
    }
}

pub fn default_embedding() -> Vec<f64> {
    // Highest: 16, 3, 7, 0, 12
    let mut e = vec![0.0; FIELD_COUNT];
    e[16] = 0.9;
    e[3] = 0.8;
    e[7] = 0.7;
    e[0] = 0.6;
    e[12] = 0.5;
    e
}

pub async fn setup_with(prediction: Vec<f64>, embedding: Vec<f64>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let db = init_database(&dir.path().join("edupath.db")).await.unwrap();

    let mut bare = unit_topic(3, 0);
    bare.topic_weight = None;
    let seed = SeedData {
        schools: vec![School {
            id: 1,
            npsn: Some("20100001".into()),
            school_name: Some("SMA Negeri 1 Jakarta".into()),
            school_province: Some("DKI Jakarta".into()),
            school_city: Some("Jakarta Pusat".into()),
        }],
        school_majors: vec![SchoolMajor {
            id: 1,
            school_major_name: Some("IPA".into()),
        }],
        topics: vec![unit_topic(1, 0), unit_topic(2, 5), bare],
        ..Default::default()
    };
    seed_reference_data(&db, &seed).await.unwrap();

    let mut accepted = HashMap::new();
    for (token, subject, email) in [
        ("id-token-alice", "uid-alice", "alice@example.com"),
        ("id-token-bob", "uid-bob", "bob@example.com"),
    ] {
        accepted.insert(
            token.to_string(),
            ExternalIdentity {
                subject: subject.to_string(),
                email: email.to_string(),
            },
        );
    }

    let reference = ReferenceMatrix::new(
        REFERENCE_LABELS.iter().map(|s| s.to_string()).collect(),
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ],
    )
    .unwrap();

    let predictor = Arc::new(StubPredictor {
        prediction,
        embedding,
        calls: AtomicUsize::new(0),
        features: Mutex::new(Vec::new()),
    });
    let gateway = RecommendationGateway::new(predictor.clone(), reference, 10, 5);

    let state = AppState::new(
        db,
        SessionIssuer::new(SECRET, 60).unwrap(),
        Arc::new(StubVerifier { accepted }),
        gateway,
    );

    TestApp {
        state,
        predictor,
        _dir: dir,
    }
}

pub async fn setup() -> TestApp {
    setup_with(vec![0.9, 0.1, 0.0], default_embedding()).await
}

impl TestApp {
    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Send a request and return status plus body
    ///
    /// Non-JSON bodies (framework rejections) come back as a JSON string.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Exchange a stub ID token for a session token
    pub async fn login(&self, id_token: &str) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/auth/access-token",
                None,
                serde_json::json!({"token": id_token}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["access_token"].as_str().unwrap().to_string()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}
