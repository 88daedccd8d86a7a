//! Recommendation gateway
//!
//! Turns a user's accumulated weights (or free text) into recommendations.
//! The hosted models sit behind [`PredictionService`]; everything after the
//! call (cosine re-ranking, label mapping) is local and deterministic.

pub mod ranking;
pub mod tokenizer;
pub mod vertex;

use async_trait::async_trait;
use edupath_common::api::FieldSummary;
use edupath_common::db::weights::load_user_weight;
use edupath_common::fields::{labels_for, FIELD_COUNT};
use edupath_common::weights::top_k_indices;
use edupath_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, info};

pub use ranking::ReferenceMatrix;
pub use tokenizer::WordPieceTokenizer;
pub use vertex::VertexPredictionClient;

/// Number of fields reported by the field summary
pub const FIELD_SUMMARY_SIZE: usize = 3;

/// External model capability
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Numeric model: weight vector in, score vector out
    async fn predict(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Text model: embedding for free text
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

pub struct RecommendationGateway {
    predictor: Arc<dyn PredictionService>,
    reference: ReferenceMatrix,
    top_k: usize,
    text_top_k: usize,
}

impl RecommendationGateway {
    pub fn new(
        predictor: Arc<dyn PredictionService>,
        reference: ReferenceMatrix,
        top_k: usize,
        text_top_k: usize,
    ) -> Self {
        Self {
            predictor,
            reference,
            top_k,
            text_top_k,
        }
    }

    /// Top-k reference labels for the user's accumulated weights
    ///
    /// Fails with `InvalidState` before any external call when the user has
    /// no weights yet.
    pub async fn recommend_from_weight(
        &self,
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<String>> {
        let weight = load_user_weight(db, user_id)
            .await?
            .ok_or_else(|| Error::InvalidState("User topic weights not found.".to_string()))?;

        let prediction = self.predictor.predict(weight.as_slice()).await?;
        let recommendations = self.reference.rank(&prediction, self.top_k)?;

        info!(user_id, count = recommendations.len(), "Numeric recommendation served");
        Ok(recommendations)
    }

    /// Field labels for the highest embedding dimensions of `text`
    pub async fn recommend_from_text(&self, text: &str) -> Result<Vec<String>> {
        let embedding = self.predictor.embed(text).await?;
        if embedding.len() != FIELD_COUNT {
            return Err(Error::Service(format!(
                "Embedding has {} dimensions, expected {}",
                embedding.len(),
                FIELD_COUNT
            )));
        }

        let top = top_k_indices(&embedding, self.text_top_k);
        debug!(?top, "Text recommendation dimensions");
        Ok(labels_for(&top))
    }
}

/// Labels of the user's three strongest fields; no external call
pub async fn field_summary(db: &SqlitePool, user_id: i64) -> Result<FieldSummary> {
    let weight = load_user_weight(db, user_id)
        .await?
        .ok_or_else(|| Error::InvalidState("User topic weights not found.".to_string()))?;

    Ok(FieldSummary {
        top_topics: labels_for(&weight.top_indices(FIELD_SUMMARY_SIZE)),
    })
}
