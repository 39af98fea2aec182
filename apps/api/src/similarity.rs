//! Embedding-similarity collaborator.
//!
//! The matching engine needs one number: how semantically close the full
//! resume text is to the full job description, on a 0–100 scale. Computing
//! that is delegated to an external embedding-comparison service behind the
//! [`SimilarityScorer`] trait; a failure here is fatal for the pipeline
//! because the match score is load-bearing for every downstream stage.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SimilarityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("similarity service returned status {status}: {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    /// Returns a semantic similarity score in `[0, 100]`.
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, SimilarityError>;
}

#[derive(Debug, Serialize)]
struct SimilarityRequest<'a> {
    text_a: &'a str,
    text_b: &'a str,
}

#[derive(Debug, Deserialize)]
struct SimilarityResponse {
    score: f64,
}

/// Production scorer backed by an HTTP embedding-comparison service.
///
/// The service contract is `POST {base_url}/similarity` with two texts and a
/// `{"score": <float>}` response on the 0–100 scale. Out-of-range responses
/// are clamped rather than rejected.
pub struct HttpSimilarityClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSimilarityClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl SimilarityScorer for HttpSimilarityClient {
    async fn score(&self, text_a: &str, text_b: &str) -> Result<f64, SimilarityError> {
        let mut request = self
            .http
            .post(format!("{}/similarity", self.base_url))
            .json(&SimilarityRequest { text_a, text_b });

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SimilarityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let decoded: SimilarityResponse = response.json().await?;
        debug!("similarity score: {:.2}", decoded.score);

        Ok(decoded.score.clamp(0.0, 100.0))
    }
}
