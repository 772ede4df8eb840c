use async_trait::async_trait;

use crate::domain::{UserId, UserProfile};

use super::RepositoryError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, RepositoryError>;

    async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Lightweight fields written on the inline path. `None` leaves a field as is.
    async fn update_activity_fields(
        &self,
        uid: &UserId,
        active_directives: Option<&[String]>,
        region: Option<&str>,
    ) -> Result<(), RepositoryError>;
}
