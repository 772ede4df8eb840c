use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::ports::{MediaSourceError, StockPhotoSearch};
use crate::presentation::config::MediaSettings;

pub struct UnsplashClient {
    client: Client,
    endpoint: String,
    access_key: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Deserialize)]
struct PhotoUrls {
    regular: String,
}

impl UnsplashClient {
    pub fn new(endpoint: impl Into<String>, access_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            access_key,
        }
    }

    pub fn from_settings(settings: &MediaSettings) -> Self {
        Self::new(
            settings.stock_endpoint.clone(),
            settings.stock_access_key.clone(),
        )
    }
}

#[async_trait]
impl StockPhotoSearch for UnsplashClient {
    async fn first_match(&self, query: &str) -> Result<String, MediaSourceError> {
        let access_key = self
            .access_key
            .as_deref()
            .ok_or_else(|| MediaSourceError::NotConfigured("stock access key".to_string()))?;

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query), ("orientation", "landscape")])
            .header("Authorization", format!("Client-ID {}", access_key))
            .send()
            .await
            .map_err(|e| MediaSourceError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MediaSourceError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| MediaSourceError::InvalidPayload(e.to_string()))?;

        search
            .results
            .into_iter()
            .next()
            .map(|photo| photo.urls.regular)
            .ok_or(MediaSourceError::NoResults)
    }
}
