use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{
    ChatRequest, GenerationRequest, LlmClient, LlmClientError, LlmTokenStream, SafetyThreshold,
};
use crate::domain::TurnRole;

use super::sse;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_tokens: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> Result<String, LlmClientError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(LlmClientError::Blocked(reason.clone()));
        }

        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| LlmClientError::InvalidResponse("empty candidates".to_string()))?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(LlmClientError::Blocked("SAFETY".to_string()));
        }

        Ok(candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect())
    }
}

fn safety_settings(threshold: SafetyThreshold) -> Vec<SafetySetting> {
    HARM_CATEGORIES
        .iter()
        .map(|&category| SafetySetting {
            category,
            threshold: threshold.as_provider_str(),
        })
        .collect()
}

fn system_instruction(system: &Option<String>) -> Option<Content> {
    system.as_ref().map(|text| Content {
        role: None,
        parts: vec![Part { text: text.clone() }],
    })
}

impl GeminiClient {
    pub fn new(base_url: Option<String>, api_key: String, max_tokens: usize) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| GEMINI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client: Client::new(),
            base_url,
            api_key,
            max_tokens,
        }
    }

    async fn post(
        &self,
        url: String,
        body: &GenerateContentRequest,
    ) -> Result<reqwest::Response, LlmClientError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
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
impl LlmClient for GeminiClient {
    async fn generate_object(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<Value, LlmClientError> {
        let body = GenerateContentRequest {
            system_instruction: system_instruction(&request.system),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: self.max_tokens,
                response_mime_type: Some("application/json"),
                response_schema: Some(request.schema.clone()),
            },
            safety_settings: safety_settings(request.safety_threshold),
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let response: GenerateContentResponse = self
            .post(url, &body)
            .await?
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let text = response.text()?;
        serde_json::from_str(&text).map_err(|e| LlmClientError::InvalidResponse(e.to_string()))
    }

    async fn stream_text(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> Result<LlmTokenStream, LlmClientError> {
        let contents = request
            .messages
            .iter()
            .map(|turn| Content {
                role: Some(
                    match turn.role {
                        TurnRole::User => "user",
                        TurnRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: turn.content.clone(),
                }],
            })
            .collect();

        let body = GenerateContentRequest {
            system_instruction: system_instruction(&request.system),
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: self.max_tokens,
                response_mime_type: None,
                response_schema: None,
            },
            safety_settings: safety_settings(request.safety_threshold),
        };

        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        );
        let response = self.post(url, &body).await?;

        let token_stream = sse::data_lines(response.bytes_stream()).filter_map(|line| async move {
            match line {
                Ok(data) => match serde_json::from_str::<GenerateContentResponse>(&data) {
                    Ok(chunk) => match chunk.text() {
                        Ok(token) if !token.is_empty() => Some(Ok(token)),
                        Ok(_) => None,
                        Err(e) => Some(Err(e)),
                    },
                    Err(e) => {
                        tracing::debug!(error = %e, "Skipping unparseable SSE event");
                        None
                    }
                },
                Err(e) => Some(Err(LlmClientError::from_reqwest(e))),
            }
        });

        Ok(Box::pin(token_stream))
    }
}
