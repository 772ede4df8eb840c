use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use crate::application::ports::{RepositoryError, SessionRepository};
use crate::domain::{Session, SessionKey, Turn, UserId};

pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    uid: String,
    slot: String,
    turns: Json<Vec<Turn>>,
    last_activity_ms: i64,
    closed: bool,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session {
            key: SessionKey::new(UserId::new(row.uid), row.slot),
            turns: row.turns.0,
            last_activity_ms: row.last_activity_ms,
            closed: row.closed,
        }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self), fields(uid = %key.uid, slot = %key.slot))]
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT uid, slot, turns, last_activity_ms, closed
            FROM sessions
            WHERE uid = $1 AND slot = $2
            "#,
        )
        .bind(key.uid.as_str())
        .bind(&key.slot)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(row.map(Session::from))
    }

    #[instrument(skip(self, session), fields(uid = %session.key.uid, slot = %session.key.slot))]
    async fn save(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (uid, slot, turns, last_activity_ms, closed, claimed_at_ms)
            VALUES ($1, $2, $3, $4, $5, NULL)
            ON CONFLICT (uid, slot) DO UPDATE
            SET turns = EXCLUDED.turns,
                last_activity_ms = EXCLUDED.last_activity_ms,
                closed = EXCLUDED.closed,
                claimed_at_ms = NULL
            "#,
        )
        .bind(session.key.uid.as_str())
        .bind(&session.key.slot)
        .bind(Json(&session.turns))
        .bind(session.last_activity_ms)
        .bind(session.closed)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(uid = %uid))]
    async fn list_for_user(&self, uid: &UserId) -> Result<Vec<Session>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT uid, slot, turns, last_activity_ms, closed
            FROM sessions
            WHERE uid = $1
            ORDER BY slot
            "#,
        )
        .bind(uid.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(rows.into_iter().map(Session::from).collect())
    }

    #[instrument(skip(self), fields(uid = %key.uid, slot = %key.slot))]
    async fn set_activity(
        &self,
        key: &SessionKey,
        last_activity_ms: i64,
        closed: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET last_activity_ms = $3, closed = $4
            WHERE uid = $1 AND slot = $2
            "#,
        )
        .bind(key.uid.as_str())
        .bind(&key.slot)
        .bind(last_activity_ms)
        .bind(closed)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(key.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(uid = %key.uid, slot = %key.slot))]
    async fn try_claim(
        &self,
        key: &SessionKey,
        now_ms: i64,
        lease_ms: i64,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET claimed_at_ms = $3
            WHERE uid = $1 AND slot = $2
              AND (claimed_at_ms IS NULL OR claimed_at_ms <= $3 - $4)
            "#,
        )
        .bind(key.uid.as_str())
        .bind(&key.slot)
        .bind(now_ms)
        .bind(lease_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(uid = %key.uid, slot = %key.slot))]
    async fn delete(&self, key: &SessionKey) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE uid = $1 AND slot = $2")
            .bind(key.uid.as_str())
            .bind(&key.slot)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}
