use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::application::ports::{
    ChatRequest, GenerationRequest, LlmClient, LlmClientError, LlmTokenStream,
};
use crate::presentation::config::{LlmProvider, LlmSettings};

use super::sse;

const AZURE_API_VERSION: &str = "2024-08-01-preview";

/// Chat-completions client for OpenAI, LM Studio and Azure OpenAI. Safety
/// thresholds are a provider-side setting there and are not forwarded.
pub struct OpenAiCompatibleClient {
    client: Client,
    provider: LlmProvider,
    base_url: String,
    api_key: String,
    max_tokens: usize,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

fn with_system(system: &Option<String>, mut messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    if let Some(system) = system {
        messages.insert(
            0,
            ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            },
        );
    }
    messages
}

impl OpenAiCompatibleClient {
    fn endpoint(&self, model: &str) -> String {
        match self.provider {
            LlmProvider::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, model, AZURE_API_VERSION
            ),
            _ => format!("{}/chat/completions", self.base_url),
        }
    }

    /// Azure addresses the model through the deployment path instead of the body.
    fn body_model<'a>(&self, model: &'a str) -> Option<&'a str> {
        match self.provider {
            LlmProvider::Azure => None,
            _ => Some(model),
        }
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.provider == LlmProvider::Azure {
            request.header("api-key", &self.api_key)
        } else {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }

    async fn send(
        &self,
        model: &str,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<reqwest::Response, LlmClientError> {
        let request = self.client.post(self.endpoint(model)).json(body);
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(LlmClientError::from_reqwest)?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmClientError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn generate_object(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<Value, LlmClientError> {
        let messages = with_system(
            &request.system,
            vec![ChatMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
        );
        let body = ChatCompletionRequest {
            model: self.body_model(model),
            messages,
            max_tokens: self.max_tokens,
            temperature: request.temperature,
            stream: None,
            response_format: Some(json!({
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "schema": request.schema,
                }
            })),
        };

        let completion_response: ChatCompletionResponse = self
            .send(model, &body)
            .await?
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let content = completion_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))?;

        serde_json::from_str(&content).map_err(|e| LlmClientError::InvalidResponse(e.to_string()))
    }

    async fn stream_text(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> Result<LlmTokenStream, LlmClientError> {
        let messages = with_system(
            &request.system,
            request
                .messages
                .iter()
                .map(|turn| ChatMessage {
                    role: turn.role.as_str().to_string(),
                    content: turn.content.clone(),
                })
                .collect(),
        );
        let body = ChatCompletionRequest {
            model: self.body_model(model),
            messages,
            max_tokens: self.max_tokens,
            temperature: request.temperature,
            stream: Some(true),
            response_format: None,
        };

        let stream = self.send(model, &body).await?.bytes_stream();
        let token_stream = sse::data_lines(stream)
            .take_while(|line| {
                futures::future::ready(!matches!(line, Ok(data) if data.as_str() == "[DONE]"))
            })
            .filter_map(|line| async move {
                match line {
                    Ok(data) => serde_json::from_str::<ChatCompletionChunk>(&data)
                        .ok()
                        .and_then(|chunk| chunk.choices.into_iter().next())
                        .and_then(|choice| choice.delta.content)
                        .map(Ok),
                    Err(e) => Some(Err(LlmClientError::from_reqwest(e))),
                }
            });

        Ok(Box::pin(token_stream))
    }
}

pub fn create_openai_compatible_client(
    settings: &LlmSettings,
) -> Result<OpenAiCompatibleClient, LlmClientError> {
    let base_url = match settings.provider {
        LlmProvider::OpenAi => settings
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        LlmProvider::LmStudio => settings.base_url.clone().ok_or_else(|| {
            LlmClientError::InvalidResponse("base_url required for lmstudio provider".to_string())
        })?,
        LlmProvider::Azure => settings.azure_endpoint.clone().ok_or_else(|| {
            LlmClientError::InvalidResponse(
                "azure_endpoint required for azure provider".to_string(),
            )
        })?,
        LlmProvider::Gemini => {
            return Err(LlmClientError::InvalidResponse(
                "gemini is not an openai-compatible provider".to_string(),
            ));
        }
    };

    Ok(OpenAiCompatibleClient {
        client: Client::new(),
        provider: settings.provider,
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: settings.api_key.clone(),
        max_tokens: settings.max_tokens,
    })
}
