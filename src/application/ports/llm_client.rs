use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;
use serde_json::Value;

use crate::domain::TurnRole;

pub type LlmTokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmClientError>> + Send>>;

/// Block threshold forwarded to the provider's content-safety filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyThreshold {
    BlockNone,
    BlockOnlyHigh,
    #[default]
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

impl SafetyThreshold {
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            SafetyThreshold::BlockNone => "BLOCK_NONE",
            SafetyThreshold::BlockOnlyHigh => "BLOCK_ONLY_HIGH",
            SafetyThreshold::BlockMediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            SafetyThreshold::BlockLowAndAbove => "BLOCK_LOW_AND_ABOVE",
        }
    }
}

/// Schema-constrained generation request. The same value is replayed on fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub schema_name: String,
    pub schema: Value,
    pub temperature: f32,
    pub safety_threshold: SafetyThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
    pub safety_threshold: SafetyThreshold,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate_object(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<Value, LlmClientError>;

    async fn stream_text(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> Result<LlmTokenStream, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("request timed out")]
    Timeout,
    #[error("blocked by safety filter: {0}")]
    Blocked(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmClientError {
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LlmClientError::Timeout
        } else {
            LlmClientError::ApiRequestFailed(error.to_string())
        }
    }
}
