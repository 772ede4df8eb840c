use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::ports::{
    PostRepository, RepositoryError, SessionRepository, UserRepository,
};
use crate::domain::{
    Post, PostId, PostStatus, PublicContent, Session, SessionKey, UserId, UserProfile,
};

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    claimed_at_ms: Option<i64>,
}

/// Sessions keyed by `(uid, slot)`. Used without a database and in tests.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionKey, StoredSession>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>, RepositoryError> {
        Ok(self
            .sessions
            .read()
            .await
            .get(key)
            .map(|stored| stored.session.clone()))
    }

    async fn save(&self, session: &Session) -> Result<(), RepositoryError> {
        self.sessions.write().await.insert(
            session.key.clone(),
            StoredSession {
                session: session.clone(),
                claimed_at_ms: None,
            },
        );
        Ok(())
    }

    async fn list_for_user(&self, uid: &UserId) -> Result<Vec<Session>, RepositoryError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|stored| &stored.session.key.uid == uid)
            .map(|stored| stored.session.clone())
            .collect();
        sessions.sort_by(|a, b| a.key.slot.cmp(&b.key.slot));
        Ok(sessions)
    }

    async fn set_activity(
        &self,
        key: &SessionKey,
        last_activity_ms: i64,
        closed: bool,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get_mut(key)
            .ok_or_else(|| RepositoryError::NotFound(key.to_string()))?;
        stored.session.last_activity_ms = last_activity_ms;
        stored.session.closed = closed;
        Ok(())
    }

    async fn try_claim(
        &self,
        key: &SessionKey,
        now_ms: i64,
        lease_ms: i64,
    ) -> Result<bool, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let Some(stored) = sessions.get_mut(key) else {
            return Ok(false);
        };
        match stored.claimed_at_ms {
            Some(claimed_at) if claimed_at > now_ms - lease_ms => Ok(false),
            _ => {
                stored.claimed_at_ms = Some(now_ms);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), RepositoryError> {
        self.sessions.write().await.remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<PostId, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by_key(|p| p.created_at);
        posts
    }

    fn transition(post: &mut Post, next: PostStatus) -> Result<(), RepositoryError> {
        if !post.status.can_transition_to(next) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "post {} cannot move from {} to {}",
                post.id, post.status, next
            )));
        }
        post.status = next;
        post.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait::async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: &Post) -> Result<(), RepositoryError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "post {} already exists",
                post.id
            )));
        }
        posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn complete(&self, id: PostId, content: &PublicContent) -> Result<(), RepositoryError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Self::transition(post, PostStatus::Completed)?;
        post.public_content = Some(content.clone());
        Ok(())
    }

    async fn mark_failed(&self, id: PostId, error_message: &str) -> Result<(), RepositoryError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Self::transition(post, PostStatus::Failed)?;
        post.error_message = Some(error_message.to_string());
        Ok(())
    }
}

/// Profiles ordered by uid so sweeps visit users deterministically.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<UserId, UserProfile>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: UserProfile) {
        self.users.write().await.insert(profile.uid.clone(), profile);
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_user_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        Ok(self.users.read().await.keys().cloned().collect())
    }

    async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Ok(self.users.read().await.get(uid).cloned())
    }

    async fn update_activity_fields(
        &self,
        uid: &UserId,
        active_directives: Option<&[String]>,
        region: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let profile = users
            .get_mut(uid)
            .ok_or_else(|| RepositoryError::NotFound(uid.to_string()))?;
        if let Some(directives) = active_directives {
            profile.active_directives = directives.to_vec();
        }
        if let Some(region) = region {
            profile.region = Some(region.to_string());
        }
        Ok(())
    }
}
