use async_trait::async_trait;

use crate::domain::{Post, PostId, PublicContent};

use super::RepositoryError;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: &Post) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError>;

    /// `processing` -> `completed`. Any other current status is a constraint violation.
    async fn complete(&self, id: PostId, content: &PublicContent) -> Result<(), RepositoryError>;

    /// `processing` -> `failed`. Any other current status is a constraint violation.
    async fn mark_failed(&self, id: PostId, error_message: &str) -> Result<(), RepositoryError>;
}
