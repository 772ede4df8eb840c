use std::sync::Arc;

use crate::application::ports::LlmClientError;
use crate::domain::{CharacterContext, EditorialVerdict};

use super::ModelFallback;
use super::prompts::{
    EDITORIAL_SCHEMA_NAME, editorial_prompt, editorial_schema, editorial_system_prompt,
};

pub struct EditorialGate {
    generator: Arc<ModelFallback>,
}

impl EditorialGate {
    pub fn new(generator: Arc<ModelFallback>) -> Self {
        Self { generator }
    }

    /// One structured generation over the flattened transcript. Identifying details
    /// are scrubbed by the prompt and not checked again here.
    pub async fn judge(
        &self,
        transcript: &str,
        character: &CharacterContext,
    ) -> Result<EditorialVerdict, EditorialError> {
        let request = self.generator.structured_request(
            &editorial_system_prompt(character),
            editorial_prompt(transcript),
            EDITORIAL_SCHEMA_NAME,
            editorial_schema(),
        );

        let verdict: EditorialVerdict = self.generator.generate(&request).await?;

        tracing::debug!(
            is_publishable = verdict.is_publishable,
            has_draft = verdict.post.is_some(),
            "Editorial verdict"
        );
        Ok(verdict)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditorialError {
    #[error("generation: {0}")]
    Generation(#[from] LlmClientError),
}
