//! Hosted prediction endpoint client
//!
//! Both models are served behind the same REST shape:
//! `POST {"instances": [...]}` → `{"predictions": [[...], ...]}`.
//! Only the first prediction is used.

use async_trait::async_trait;
use edupath_common::config::PredictionConfig;
use edupath_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::tokenizer::WordPieceTokenizer;
use super::PredictionService;

const USER_AGENT: &str = concat!("edupath-api/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct PredictRequest<'a, I> {
    instances: &'a [I],
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f64>>,
}

pub struct VertexPredictionClient {
    http_client: reqwest::Client,
    numeric_url: String,
    embedding_url: String,
    access_token: Option<String>,
    tokenizer: WordPieceTokenizer,
}

impl VertexPredictionClient {
    pub fn new(config: &PredictionConfig, tokenizer: WordPieceTokenizer) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Service(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            numeric_url: config.numeric_url.clone(),
            embedding_url: config.embedding_url.clone(),
            access_token: config.access_token.clone(),
            tokenizer,
        })
    }

    async fn call<I: Serialize + Sync>(&self, url: &str, instances: &[I]) -> Result<Vec<f64>> {
        let mut request = self.http_client.post(url).json(&PredictRequest { instances });
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("Prediction endpoint timed out: {}", e))
            } else {
                Error::Service(format!("Error making prediction request: {}", e))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let detail = response.text().await.unwrap_or_default();
            warn!(url, detail = %detail, "Prediction endpoint rejected request");
            return Err(Error::InvalidInput("Bad request. Invalid input.".to_string()));
        }
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Prediction endpoint failed");
            return Err(Error::Service(format!(
                "Prediction endpoint returned {}",
                status.as_u16()
            )));
        }

        let body: PredictResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("Prediction endpoint timed out: {}", e))
            } else {
                Error::Service(format!("Malformed prediction response: {}", e))
            }
        })?;

        let prediction = body
            .predictions
            .into_iter()
            .next()
            .ok_or_else(|| Error::Service("Prediction response is empty".to_string()))?;

        debug!(url, components = prediction.len(), "Prediction received");
        Ok(prediction)
    }
}

#[async_trait]
impl PredictionService for VertexPredictionClient {
    async fn predict(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.call(&self.numeric_url, &[features]).await
    }

    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let encoding = self.tokenizer.encode(text);
        self.call(&self.embedding_url, &[encoding]).await
    }
}
