use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::inference::dto::{PredictionResult, SensorReading};

/// Inference client errors, split by where the request died.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("network error: {0}")]
    Network(String),

    #[error("inference API error {0}: {1}")]
    Api(u16, String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Remote inference service: disease prediction plus the LLM-generated
/// description of a prediction.
#[async_trait]
pub trait InferenceApi: Send + Sync {
    async fn predict(&self, reading: &SensorReading) -> Result<PredictionResult, InferenceError>;
    async fn describe(&self, result: &PredictionResult) -> Result<String, InferenceError>;
}

pub struct HttpInference {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInference {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, InferenceError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| InferenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "inference request rejected");
            return Err(InferenceError::Api(status.as_u16(), detail));
        }
        Ok(response)
    }
}

#[async_trait]
impl InferenceApi for HttpInference {
    async fn predict(&self, reading: &SensorReading) -> Result<PredictionResult, InferenceError> {
        let response = self.post_json("/predict", reading).await?;
        let result: PredictionResult = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;
        debug!(disease = %result.disease, "prediction received");
        Ok(result)
    }

    async fn describe(&self, result: &PredictionResult) -> Result<String, InferenceError> {
        let response = self.post_json("/describe", result).await?;
        let text = response
            .text()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;
        debug!(bytes = text.len(), "description received");
        Ok(text)
    }
}
