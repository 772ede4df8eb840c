use async_trait::async_trait;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, MediaSourceError>;
}

#[async_trait]
pub trait StockPhotoSearch: Send + Sync {
    /// URL of the best matching landscape photo.
    async fn first_match(&self, query: &str) -> Result<String, MediaSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaSourceError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("no results for query")]
    NoResults,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("not configured: {0}")]
    NotConfigured(String),
}
