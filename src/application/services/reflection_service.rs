use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{PostRepository, RepositoryError, UserRepository};
use crate::domain::{CharacterContext, Post, PostId, PrivateContent, UserId};

use super::post_publisher::author_of;

#[derive(Debug, Clone)]
pub struct ReflectionRequest {
    pub uid: UserId,
    pub rant: String,
    pub counsel: Option<String>,
    pub directives: Option<Vec<String>>,
    pub is_public: bool,
    pub region: Option<String>,
}

/// Work item handed to the reflection worker after the placeholder post exists.
#[derive(Debug, Clone)]
pub struct ReflectionTask {
    pub post_id: PostId,
    pub uid: UserId,
    pub rant: String,
    pub counsel: Option<String>,
    pub directives: Vec<String>,
    pub character: CharacterContext,
}

/// Request-path half of an inline post: records the user's fields, writes a
/// `processing` placeholder and enqueues the drafting.
pub struct ReflectionService {
    user_repository: Arc<dyn UserRepository>,
    post_repository: Arc<dyn PostRepository>,
    sender: mpsc::Sender<ReflectionTask>,
}

impl ReflectionService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        post_repository: Arc<dyn PostRepository>,
        sender: mpsc::Sender<ReflectionTask>,
    ) -> Self {
        Self {
            user_repository,
            post_repository,
            sender,
        }
    }

    #[tracing::instrument(skip(self, request), fields(uid = %request.uid))]
    pub async fn enqueue(&self, request: ReflectionRequest) -> Result<PostId, ReflectionError> {
        if request.rant.trim().is_empty() {
            return Err(ReflectionError::EmptyReflection);
        }

        let mut profile = self
            .user_repository
            .get_profile(&request.uid)
            .await?
            .ok_or_else(|| ReflectionError::UserNotFound(request.uid.to_string()))?;

        self.user_repository
            .update_activity_fields(
                &request.uid,
                request.directives.as_deref(),
                request.region.as_deref(),
            )
            .await?;
        if let Some(region) = &request.region {
            profile.region = Some(region.clone());
        }
        let directives = request
            .directives
            .clone()
            .unwrap_or_else(|| profile.active_directives.clone());

        let post = Post::processing(
            request.uid.clone(),
            request.is_public,
            PrivateContent {
                raw_input: request.rant.clone(),
                raw_advice: request.counsel.clone(),
            },
            author_of(&profile),
        );
        self.post_repository.create(&post).await?;

        let task = ReflectionTask {
            post_id: post.id,
            uid: request.uid,
            rant: request.rant,
            counsel: request.counsel,
            directives,
            character: profile.character,
        };

        // Never wait for a slot: the request must return once the placeholder exists.
        if let Err(e) = self.sender.try_send(task) {
            tracing::error!(error = %e, post_id = %post.id, "Failed to enqueue reflection");
            if let Err(mark_err) = self
                .post_repository
                .mark_failed(post.id, "reflection queue unavailable")
                .await
            {
                tracing::warn!(
                    error = %mark_err,
                    post_id = %post.id,
                    "Failed to mark post failed"
                );
            }
            return Err(ReflectionError::QueueUnavailable);
        }

        tracing::info!(post_id = %post.id, "Reflection enqueued");
        Ok(post.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReflectionError {
    #[error("reflection text is empty")]
    EmptyReflection,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("reflection queue unavailable")]
    QueueUnavailable,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
