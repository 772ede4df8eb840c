use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use crate::application::ports::{RepositoryError, UserRepository};
use crate::domain::{CharacterContext, UserId, UserProfile};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    uid: String,
    display_name: Option<String>,
    region: Option<String>,
    character: Option<Json<CharacterContext>>,
    active_directives: Json<Vec<String>>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            uid: UserId::new(row.uid),
            display_name: row.display_name,
            region: row.region,
            character: row.character.map(|c| c.0).unwrap_or_default(),
            active_directives: row.active_directives.0,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn list_user_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let uids: Vec<String> = sqlx::query_scalar("SELECT uid FROM users ORDER BY uid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(uids.into_iter().map(UserId::new).collect())
    }

    #[instrument(skip(self), fields(uid = %uid))]
    async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT uid, display_name, region, character, active_directives
            FROM users
            WHERE uid = $1
            "#,
        )
        .bind(uid.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(row.map(UserProfile::from))
    }

    #[instrument(skip(self, active_directives), fields(uid = %uid))]
    async fn update_activity_fields(
        &self,
        uid: &UserId,
        active_directives: Option<&[String]>,
        region: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active_directives = COALESCE($2, active_directives),
                region = COALESCE($3, region),
                updated_at = NOW()
            WHERE uid = $1
            "#,
        )
        .bind(uid.as_str())
        .bind(active_directives.map(Json))
        .bind(region)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(uid.to_string()));
        }
        Ok(())
    }
}
