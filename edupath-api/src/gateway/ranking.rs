//! Cosine re-ranking against the reference matrix
//!
//! Rows are L2-normalized once at load time. A query is normalized per call,
//! so the ranking is invariant to positive scaling of the query.

use edupath_common::weights::top_k_indices;
use edupath_common::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct MatrixFile {
    labels: Vec<String>,
    features: Vec<Vec<f64>>,
}

/// Labelled reference items and their normalized feature rows
#[derive(Debug, Clone)]
pub struct ReferenceMatrix {
    labels: Vec<String>,
    rows: Vec<Vec<f64>>,
    dim: usize,
}

/// Divide by the L2 norm; a zero vector stays zero
pub fn l2_normalize(values: &[f64]) -> Vec<f64> {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm == 0.0 {
        return values.to_vec();
    }
    values.iter().map(|v| v / norm).collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl ReferenceMatrix {
    /// Load `{"labels": [...], "features": [[...], ...]}`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read reference matrix {}: {}", path.display(), e))
        })?;
        let file: MatrixFile = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse reference matrix {}: {}", path.display(), e))
        })?;

        let matrix = Self::new(file.labels, file.features)?;
        info!(
            items = matrix.rows.len(),
            dim = matrix.dim,
            "Loaded reference matrix from {}",
            path.display()
        );
        Ok(matrix)
    }

    pub fn new(labels: Vec<String>, features: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != features.len() {
            return Err(Error::Config(format!(
                "Reference matrix has {} labels but {} rows",
                labels.len(),
                features.len()
            )));
        }

        let dim = features.first().map(Vec::len).unwrap_or(0);
        if dim == 0 {
            return Err(Error::Config("Reference matrix is empty".to_string()));
        }
        if let Some(bad) = features.iter().position(|row| row.len() != dim) {
            return Err(Error::Config(format!(
                "Reference matrix row {} has {} columns, expected {}",
                bad,
                features[bad].len(),
                dim
            )));
        }

        let rows = features.iter().map(|row| l2_normalize(row)).collect();
        Ok(Self { labels, rows, dim })
    }

    /// Cosine similarity of `query` against every row, in row order
    pub fn similarities(&self, query: &[f64]) -> Result<Vec<f64>> {
        if query.len() != self.dim {
            return Err(Error::Service(format!(
                "Prediction has {} components, reference matrix expects {}",
                query.len(),
                self.dim
            )));
        }

        let query = l2_normalize(query);
        Ok(self.rows.iter().map(|row| dot(&query, row)).collect())
    }

    /// Labels of the `k` most similar rows, highest first; ties keep row order
    pub fn rank(&self, query: &[f64], k: usize) -> Result<Vec<String>> {
        let similarities = self.similarities(query)?;
        Ok(top_k_indices(&similarities, k)
            .into_iter()
            .map(|i| self.labels[i].clone())
            .collect())
    }
}
