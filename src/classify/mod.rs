//! Zero-shot classification seam
//!
//! Classification is an external black box: text plus a candidate label
//! list in, the best-matching label (with a confidence score) out. The
//! sorter never retries; a failed classification leaves the file in the
//! intake directory for the next cycle.

pub mod zero_shot;

pub use zero_shot::ZeroShotClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the classification backend
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The HTTP request itself failed
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with an error status
    #[error("Classifier API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered 200 but with no ranked labels
    #[error("Classifier returned no labels")]
    EmptyResponse,
}

/// Best label for a piece of text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// Winning candidate label
    pub label: String,
    /// Model confidence in [0, 1]
    pub score: f64,
}

/// Text + candidate labels -> best label
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Classification, ClassifyError>;
}
