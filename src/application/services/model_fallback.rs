use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::application::ports::{
    ChatRequest, ChatTurn, GenerationRequest, LlmClient, LlmClientError, LlmTokenStream,
    SafetyThreshold,
};

/// Runs a request on the primary model and, on any error, replays the identical
/// request once on the fallback model. The fallback's error is the one returned.
pub struct ModelFallback {
    llm_client: Arc<dyn LlmClient>,
    primary_model: String,
    fallback_model: String,
    temperature: f32,
    safety_threshold: SafetyThreshold,
}

impl ModelFallback {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        primary_model: impl Into<String>,
        fallback_model: impl Into<String>,
        temperature: f32,
        safety_threshold: SafetyThreshold,
    ) -> Self {
        Self {
            llm_client,
            primary_model: primary_model.into(),
            fallback_model: fallback_model.into(),
            temperature,
            safety_threshold,
        }
    }

    pub fn structured_request(
        &self,
        system: &str,
        prompt: String,
        schema_name: &str,
        schema: Value,
    ) -> GenerationRequest {
        GenerationRequest {
            system: Some(system.to_string()),
            prompt,
            schema_name: schema_name.to_string(),
            schema,
            temperature: self.temperature,
            safety_threshold: self.safety_threshold,
        }
    }

    pub fn chat_request(&self, system: String, messages: Vec<ChatTurn>) -> ChatRequest {
        ChatRequest {
            system: Some(system),
            messages,
            temperature: self.temperature,
            safety_threshold: self.safety_threshold,
        }
    }

    pub async fn generate<T>(&self, request: &GenerationRequest) -> Result<T, LlmClientError>
    where
        T: DeserializeOwned,
    {
        match self.attempt(&self.primary_model, request).await {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    model = %self.primary_model,
                    fallback = %self.fallback_model,
                    schema = %request.schema_name,
                    "Primary model failed, retrying on fallback"
                );
                self.attempt(&self.fallback_model, request)
                    .await
                    .inspect_err(|e| {
                        tracing::error!(
                            error = %e,
                            model = %self.fallback_model,
                            "Fallback model failed"
                        )
                    })
            }
        }
    }

    /// Fallback applies to opening the stream; errors after the first token are not retried.
    pub async fn stream(&self, request: &ChatRequest) -> Result<LlmTokenStream, LlmClientError> {
        match self
            .llm_client
            .stream_text(&self.primary_model, request)
            .await
        {
            Ok(stream) => Ok(stream),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    model = %self.primary_model,
                    fallback = %self.fallback_model,
                    "Primary model stream failed, retrying on fallback"
                );
                self.llm_client
                    .stream_text(&self.fallback_model, request)
                    .await
            }
        }
    }

    async fn attempt<T>(&self, model: &str, request: &GenerationRequest) -> Result<T, LlmClientError>
    where
        T: DeserializeOwned,
    {
        let value = self.llm_client.generate_object(model, request).await?;
        serde_json::from_value(value).map_err(|e| {
            LlmClientError::InvalidResponse(format!(
                "{} does not match {}: {}",
                model, request.schema_name, e
            ))
        })
    }
}
