//! HTTP client for a hosted zero-shot classification model
//!
//! Speaks the Hugging Face inference protocol for zero-shot pipelines:
//! POST `{"inputs": text, "parameters": {"candidate_labels": [...]}}`,
//! response `{"labels": [...], "scores": [...]}` ranked best-first.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Classification, Classifier, ClassifyError};

/// Default model endpoint; the stock zero-shot pipeline model
const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

/// Upper bound on request text; the model truncates long inputs anyway,
/// so there is no point shipping a whole document body over the wire
const MAX_INPUT_CHARS: usize = 4096;

/// Request body for the zero-shot endpoint
#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// Response body: labels and scores are parallel arrays, best-first
#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Error body returned by the inference API
#[derive(Deserialize)]
struct ApiError {
    error: String,
}

/// Zero-shot classification over a hosted inference endpoint
pub struct ZeroShotClient {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl ZeroShotClient {
    pub fn new(endpoint: String, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_token,
        }
    }

    /// Build a client from the environment
    ///
    /// `SORTER_CLASSIFIER_URL` overrides the default model endpoint;
    /// `SORTER_CLASSIFIER_TOKEN` supplies an optional bearer token.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("SORTER_CLASSIFIER_URL")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let api_token = std::env::var("SORTER_CLASSIFIER_TOKEN").ok();
        Self::new(endpoint, api_token)
    }
}

#[async_trait]
impl Classifier for ZeroShotClient {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
    ) -> Result<Classification, ClassifyError> {
        let truncated = truncate_chars(text, MAX_INPUT_CHARS);

        let request = ZeroShotRequest {
            inputs: truncated,
            parameters: ZeroShotParameters { candidate_labels },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClassifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ZeroShotResponse = response.json().await?;

        match (parsed.labels.first(), parsed.scores.first()) {
            (Some(label), Some(score)) => Ok(Classification {
                label: label.clone(),
                score: *score,
            }),
            _ => Err(ClassifyError::EmptyResponse),
        }
    }
}

/// Truncate to at most `max` characters on a char boundary
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
