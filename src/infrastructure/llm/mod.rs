mod gemini_client;
mod llm_client_factory;
mod openai_compatible_client;
mod sse;

pub use gemini_client::{GEMINI_BASE_URL, GeminiClient};
pub use llm_client_factory::LlmClientFactory;
pub use openai_compatible_client::{OpenAiCompatibleClient, create_openai_compatible_client};
