use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::{ReflectionError, ReflectionRequest};
use crate::domain::{
    PostAuthor, PostId, PostOrigin, PostStatus, PrivateContent, PublicContent, UserId,
};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error_response::{error_response, rejection_response};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub uid: String,
    pub rant: String,
    #[serde(default)]
    pub counsel: Option<String>,
    #[serde(default)]
    pub directives: Option<Vec<String>>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub success: bool,
    pub post_id: String,
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_post_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    if request.uid.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "uid is required");
    }

    tracing::debug!(
        uid = %request.uid,
        rant = %sanitize_prompt(&request.rant),
        "Inline reflection received"
    );

    let reflection = ReflectionRequest {
        uid: UserId::new(request.uid),
        rant: request.rant,
        counsel: request.counsel,
        directives: request.directives,
        is_public: request.is_public.unwrap_or(true),
        region: request.region.filter(|r| !r.trim().is_empty()),
    };

    match state.reflection_service.enqueue(reflection).await {
        Ok(post_id) => (
            StatusCode::OK,
            Json(CreatePostResponse {
                success: true,
                post_id: post_id.to_string(),
            }),
        )
            .into_response(),
        Err(ReflectionError::EmptyReflection) => {
            error_response(StatusCode::BAD_REQUEST, "rant must not be empty")
        }
        Err(ReflectionError::UserNotFound(uid)) => {
            error_response(StatusCode::NOT_FOUND, format!("User not found: {}", uid))
        }
        Err(ReflectionError::QueueUnavailable) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Reflection queue unavailable, please retry",
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to accept reflection");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PostViewerQuery {
    pub uid: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStatusResponse {
    pub id: String,
    pub status: PostStatus,
    pub is_public: bool,
    pub origin: PostOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_content: Option<PublicContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_content: Option<PrivateContent>,
    pub author: PostAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[tracing::instrument(skip(state, viewer))]
pub async fn post_status_handler(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(viewer): Query<PostViewerQuery>,
) -> Response {
    let uuid = match Uuid::parse_str(&post_id) {
        Ok(u) => u,
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid post ID: {}", post_id),
            );
        }
    };

    let not_found = || {
        error_response(
            StatusCode::NOT_FOUND,
            format!("Post not found: {}", post_id),
        )
    };

    match state
        .post_repository
        .get_by_id(PostId::from_uuid(uuid))
        .await
    {
        Ok(Some(post)) => {
            let is_owner = viewer
                .uid
                .as_deref()
                .is_some_and(|uid| post.is_owned_by(&UserId::from(uid)));
            if !post.is_public && !is_owner {
                return not_found();
            }

            let response = PostStatusResponse {
                id: post.id.to_string(),
                status: post.status,
                is_public: post.is_public,
                origin: post.origin,
                public_content: post.public_content,
                private_content: if is_owner { post.private_content } else { None },
                author: post.author,
                error_message: post.error_message,
                created_at: post.created_at.to_rfc3339(),
                updated_at: post.updated_at.to_rfc3339(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch post");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch post: {}", e),
            )
        }
    }
}
