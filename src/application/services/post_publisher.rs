use std::sync::Arc;

use crate::application::ports::{PostRepository, RepositoryError};
use crate::domain::{MediaUrls, Post, PostAuthor, PostDraft, PostId, PublicContent, UserProfile};

pub struct PostPublisher {
    post_repository: Arc<dyn PostRepository>,
}

impl PostPublisher {
    pub fn new(post_repository: Arc<dyn PostRepository>) -> Self {
        Self { post_repository }
    }

    /// Writes a terminal `completed` post in one operation.
    pub async fn publish(
        &self,
        post_id: PostId,
        owner: &UserProfile,
        draft: PostDraft,
        media: MediaUrls,
    ) -> Result<Post, PublishError> {
        let post = Post::completed(
            post_id,
            owner.uid.clone(),
            PublicContent::from_draft(draft, media),
            author_of(owner),
        );
        self.post_repository.create(&post).await?;
        tracing::info!(post_id = %post.id, uid = %post.uid, "Post published");
        Ok(post)
    }

    /// Moves an existing `processing` placeholder to `completed`.
    pub async fn complete_placeholder(
        &self,
        post_id: PostId,
        draft: PostDraft,
        media: MediaUrls,
    ) -> Result<(), PublishError> {
        let content = PublicContent::from_draft(draft, media);
        self.post_repository.complete(post_id, &content).await?;
        tracing::info!(post_id = %post_id, "Post completed");
        Ok(())
    }
}

pub fn author_of(profile: &UserProfile) -> PostAuthor {
    PostAuthor {
        region: profile.region.clone(),
        display_name: profile.display_name.clone(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
