//! Weight vectors
//!
//! A rating contributes `rating * topic_weight[i]` to component `i` of the
//! user's preference vector. The addition itself happens inside SQLite (see
//! `db::weights`); this module holds the length-checked value type and the
//! top-k selection shared by the field summary and the ranking code.

use serde::{Deserialize, Serialize};

use crate::fields::FIELD_COUNT;
use crate::{Error, Result};

/// Fixed-length per-field weight vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightVector(Vec<f64>);

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = Error;

    fn try_from(components: Vec<f64>) -> Result<Self> {
        Self::from_components(components)
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(v: WeightVector) -> Self {
        v.0
    }
}

impl WeightVector {
    /// Build from components, rejecting vectors of the wrong length
    pub fn from_components(components: Vec<f64>) -> Result<Self> {
        if components.len() != FIELD_COUNT {
            return Err(Error::InvalidInput(format!(
                "weight vector must have {} components, got {}",
                FIELD_COUNT,
                components.len()
            )));
        }
        Ok(Self(components))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Indices of the `k` largest components (ties: lowest index first)
    pub fn top_indices(&self, k: usize) -> Vec<usize> {
        top_k_indices(&self.0, k)
    }
}

/// Indices of the `k` largest values, descending; equal values keep index order
pub fn top_k_indices(values: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    indices.truncate(k);
    indices
}
