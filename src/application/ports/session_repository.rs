use async_trait::async_trait;

use crate::domain::{Session, SessionKey, UserId};

use super::RepositoryError;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, RepositoryError>;

    /// Insert or replace the session; clears any sweep claim.
    async fn save(&self, session: &Session) -> Result<(), RepositoryError>;

    async fn list_for_user(&self, uid: &UserId) -> Result<Vec<Session>, RepositoryError>;

    /// Overwrite the activity timestamp and closed flag without touching turns.
    async fn set_activity(
        &self,
        key: &SessionKey,
        last_activity_ms: i64,
        closed: bool,
    ) -> Result<(), RepositoryError>;

    /// Conditional write: succeeds only when the session is unclaimed or its
    /// previous claim is older than `lease_ms`.
    async fn try_claim(
        &self,
        key: &SessionKey,
        now_ms: i64,
        lease_ms: i64,
    ) -> Result<bool, RepositoryError>;

    /// Deleting a missing session is not an error.
    async fn delete(&self, key: &SessionKey) -> Result<(), RepositoryError>;
}
