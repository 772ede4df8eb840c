use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaUrls, PostDraft, PostId, PostStatus, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicContent {
    pub title: String,
    pub pseudonym: String,
    pub letter: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_image_url: Option<String>,
}

impl PublicContent {
    pub fn from_draft(draft: PostDraft, media: MediaUrls) -> Self {
        Self {
            title: draft.title,
            pseudonym: draft.pseudonym,
            letter: draft.letter,
            response: draft.response,
            ai_image_url: media.ai_image_url,
            stock_image_url: media.stock_image_url,
        }
    }
}

/// Owner-only block: the words the user actually typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateContent {
    pub raw_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_advice: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostOrigin {
    Sweep,
    Reflection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub uid: UserId,
    pub is_public: bool,
    pub status: PostStatus,
    pub origin: PostOrigin,
    pub public_content: Option<PublicContent>,
    pub private_content: Option<PrivateContent>,
    pub author: PostAuthor,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Placeholder written before the deferred drafting runs.
    pub fn processing(
        uid: UserId,
        is_public: bool,
        private_content: PrivateContent,
        author: PostAuthor,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PostId::new(),
            uid,
            is_public,
            status: PostStatus::Processing,
            origin: PostOrigin::Reflection,
            public_content: None,
            private_content: Some(private_content),
            author,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Terminal post written in one operation by the sweep.
    pub fn completed(id: PostId, uid: UserId, content: PublicContent, author: PostAuthor) -> Self {
        let now = Utc::now();
        Self {
            id,
            uid,
            is_public: true,
            status: PostStatus::Completed,
            origin: PostOrigin::Sweep,
            public_content: Some(content),
            private_content: None,
            author,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, uid: &UserId) -> bool {
        &self.uid == uid
    }
}
