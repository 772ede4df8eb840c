use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GeneratedImage, ImageGenerator, MediaSourceError};
use crate::presentation::config::MediaSettings;

pub struct ImagenClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    sample_count: u32,
    aspect_ratio: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters<'a>,
}

#[derive(Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters<'a> {
    sample_count: u32,
    aspect_ratio: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

impl ImagenClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        sample_count: u32,
        aspect_ratio: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key,
            sample_count,
            aspect_ratio: aspect_ratio.into(),
        }
    }

    pub fn from_settings(settings: &MediaSettings) -> Self {
        Self::new(
            settings.image_endpoint.clone(),
            settings.image_api_key.clone(),
            settings.sample_count,
            settings.aspect_ratio.clone(),
        )
    }
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, MediaSourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MediaSourceError::NotConfigured("image api key".to_string()))?;

        let body = PredictRequest {
            instances: vec![Instance { prompt }],
            parameters: Parameters {
                sample_count: self.sample_count,
                aspect_ratio: &self.aspect_ratio,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| MediaSourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MediaSourceError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let predicted: PredictResponse = response
            .json()
            .await
            .map_err(|e| MediaSourceError::InvalidPayload(e.to_string()))?;

        let prediction = predicted
            .predictions
            .into_iter()
            .next()
            .ok_or(MediaSourceError::NoResults)?;
        let encoded = prediction
            .bytes_base64_encoded
            .ok_or_else(|| MediaSourceError::InvalidPayload("missing image bytes".to_string()))?;
        let decoded = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| MediaSourceError::InvalidPayload(e.to_string()))?;

        tracing::debug!(bytes = decoded.len(), "Image generated");
        Ok(GeneratedImage {
            bytes: Bytes::from(decoded),
            content_type: prediction
                .mime_type
                .unwrap_or_else(|| "image/png".to_string()),
        })
    }
}
