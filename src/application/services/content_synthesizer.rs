use std::sync::Arc;

use crate::application::ports::LlmClientError;
use crate::domain::{CharacterContext, PostDraft};

use super::ModelFallback;
use super::prompts::{
    REFLECTION_SCHEMA_NAME, reflection_prompt, reflection_schema, reflection_system_prompt,
};

pub struct ContentSynthesizer {
    generator: Arc<ModelFallback>,
}

impl ContentSynthesizer {
    pub fn new(generator: Arc<ModelFallback>) -> Self {
        Self { generator }
    }

    pub async fn draft_reflection(
        &self,
        rant: &str,
        counsel: Option<&str>,
        directives: &[String],
        character: &CharacterContext,
    ) -> Result<PostDraft, SynthesisError> {
        let request = self.generator.structured_request(
            &reflection_system_prompt(character),
            reflection_prompt(rant, counsel, directives),
            REFLECTION_SCHEMA_NAME,
            reflection_schema(),
        );

        let draft: PostDraft = self.generator.generate(&request).await?;
        if draft.letter.trim().is_empty() || draft.response.trim().is_empty() {
            return Err(SynthesisError::EmptyDraft);
        }
        Ok(draft)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("generation: {0}")]
    Generation(#[from] LlmClientError),
    #[error("model returned an empty letter or response")]
    EmptyDraft,
}
