use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{PostRepository, RepositoryError};
use crate::domain::{Post, PostDocument, PostId, PostStatus, PublicContent, UserId};

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    uid: String,
    is_public: bool,
    status: String,
    document: serde_json::Value,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = RepositoryError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<PostStatus>()
            .map_err(RepositoryError::CorruptRecord)?;
        let document = PostDocument::from_value(row.document)?;

        Ok(Post {
            id: PostId::from_uuid(row.id),
            uid: UserId::new(row.uid),
            is_public: row.is_public,
            status,
            origin: document.origin,
            public_content: document.public_content,
            private_content: document.private_content,
            author: document.author,
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn document_of(post: &Post) -> PostDocument {
    PostDocument::new(
        post.public_content.clone(),
        post.private_content.clone(),
        post.author.clone(),
        post.origin,
    )
}

impl PgPostRepository {
    async fn current_status(&self, id: PostId) -> Result<PostStatus, RepositoryError> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM posts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        status
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?
            .parse::<PostStatus>()
            .map_err(RepositoryError::CorruptRecord)
    }

    async fn settle_error(&self, id: PostId, next: PostStatus) -> RepositoryError {
        match self.current_status(id).await {
            Ok(current) => RepositoryError::ConstraintViolation(format!(
                "post {} cannot move from {} to {}",
                id, current, next
            )),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self, post), fields(post_id = %post.id, status = %post.status))]
    async fn create(&self, post: &Post) -> Result<(), RepositoryError> {
        let document = document_of(post).to_value()?;

        sqlx::query(
            r#"
            INSERT INTO posts (id, uid, is_public, status, document, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(post.id.as_uuid())
        .bind(post.uid.as_str())
        .bind(post.is_public)
        .bind(post.status.as_str())
        .bind(Json(document))
        .bind(&post.error_message)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::ConstraintViolation(db.to_string())
            }
            other => RepositoryError::QueryFailed(other.to_string()),
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(post_id = %id))]
    async fn get_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, uid, is_public, status, document, error_message, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        row.map(Post::try_from).transpose()
    }

    #[instrument(skip(self, content), fields(post_id = %id))]
    async fn complete(&self, id: PostId, content: &PublicContent) -> Result<(), RepositoryError> {
        let content = serde_json::to_value(content)?;

        let result = sqlx::query(
            r#"
            UPDATE posts
            SET status = 'completed',
                document = jsonb_set(
                    document || jsonb_build_object('schemaVersion', 2),
                    '{publicContent}',
                    $2
                ),
                updated_at = $3
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(Json(content))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.settle_error(id, PostStatus::Completed).await);
        }
        Ok(())
    }

    #[instrument(skip(self, error_message), fields(post_id = %id))]
    async fn mark_failed(&self, id: PostId, error_message: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET status = 'failed', error_message = $2, updated_at = $3
            WHERE id = $1 AND status = 'processing'
            "#,
        )
        .bind(id.as_uuid())
        .bind(error_message)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(self.settle_error(id, PostStatus::Failed).await);
        }
        Ok(())
    }
}
