use std::sync::Arc;

use crate::application::ports::{
    ChatTurn, LlmClientError, LlmTokenStream, RepositoryError, SessionRepository, UserRepository,
};
use crate::domain::{Session, SessionKey, Turn, TurnRole};

use super::ModelFallback;
use super::prompts::counsel_system_prompt;

pub struct CounselTurn {
    pub key: SessionKey,
    pub reply: LlmTokenStream,
}

/// The conversational feature: creates and mutates sessions one turn at a time.
pub struct CounselService {
    user_repository: Arc<dyn UserRepository>,
    session_repository: Arc<dyn SessionRepository>,
    generator: Arc<ModelFallback>,
}

impl CounselService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_repository: Arc<dyn SessionRepository>,
        generator: Arc<ModelFallback>,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
            generator,
        }
    }

    /// Persists the user's turn, then opens the persona's reply stream.
    #[tracing::instrument(skip(self, message), fields(uid = %key.uid, slot = %key.slot))]
    pub async fn begin_turn(
        &self,
        key: SessionKey,
        message: &str,
        now_ms: i64,
    ) -> Result<CounselTurn, CounselError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(CounselError::EmptyMessage);
        }

        let profile = self
            .user_repository
            .get_profile(&key.uid)
            .await?
            .ok_or_else(|| CounselError::UserNotFound(key.uid.to_string()))?;

        let mut session = self
            .session_repository
            .get(&key)
            .await?
            .unwrap_or_else(|| Session::new(key.clone(), now_ms));
        session.push_turn(Turn::new(TurnRole::User, message), now_ms);
        self.session_repository.save(&session).await?;

        let messages = session
            .turns
            .iter()
            .map(|turn| ChatTurn {
                role: turn.role,
                content: turn.text.clone(),
            })
            .collect();
        let request = self.generator.chat_request(
            counsel_system_prompt(&profile.character, &profile.active_directives),
            messages,
        );

        let reply = self.generator.stream(&request).await?;
        Ok(CounselTurn { key, reply })
    }

    /// Appends the finished reply. A session reaped mid-stream stays gone.
    pub async fn record_reply(
        &self,
        key: &SessionKey,
        reply: &str,
        now_ms: i64,
    ) -> Result<(), CounselError> {
        if reply.trim().is_empty() {
            return Ok(());
        }
        let Some(mut session) = self.session_repository.get(key).await? else {
            tracing::debug!(
                uid = %key.uid,
                slot = %key.slot,
                "Session gone before reply was stored"
            );
            return Ok(());
        };
        session.push_turn(Turn::new(TurnRole::Assistant, reply), now_ms);
        self.session_repository.save(&session).await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CounselError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("generation: {0}")]
    Generation(#[from] LlmClientError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
