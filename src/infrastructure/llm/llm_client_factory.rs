use std::sync::Arc;

use crate::application::ports::{LlmClient, LlmClientError};
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::{GeminiClient, create_openai_compatible_client};

pub struct LlmClientFactory;

impl LlmClientFactory {
    pub fn create(settings: &LlmSettings) -> Result<Arc<dyn LlmClient>, LlmClientError> {
        tracing::info!(
            provider = ?settings.provider,
            primary_model = %settings.primary_model,
            fallback_model = %settings.fallback_model,
            "Creating LLM client"
        );
        match settings.provider {
            LlmProvider::Gemini => Ok(Arc::new(GeminiClient::new(
                settings.base_url.clone(),
                settings.api_key.clone(),
                settings.max_tokens,
            ))),
            _ => Ok(Arc::new(create_openai_compatible_client(settings)?)),
        }
    }
}
