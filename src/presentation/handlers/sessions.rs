use std::convert::Infallible;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use futures::stream::StreamExt;
use serde::{Deserialize, Serialize};

use crate::application::services::CounselError;
use crate::domain::{SessionKey, UserId};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error_response::{error_response, rejection_response};

const GENERATION_RETRY_MESSAGE: &str =
    "The persona is unavailable right now. Please try again in a moment.";

#[derive(Debug, Deserialize)]
pub struct CloseSessionRequest {
    pub uid: String,
    #[serde(default)]
    pub slot: Option<String>,
}

#[derive(Serialize)]
pub struct CloseSessionResponse {
    pub success: bool,
    pub message: String,
}

fn session_key(state: &AppState, uid: String, slot: Option<String>) -> SessionKey {
    let slot = slot
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.settings.sweep.default_slot.clone());
    SessionKey::new(UserId::new(uid), slot)
}

#[tracing::instrument(skip(state, payload))]
pub async fn close_session_handler(
    State(state): State<AppState>,
    payload: Result<Json<CloseSessionRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    if request.uid.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "uid is required");
    }

    let key = session_key(&state, request.uid, request.slot);
    match state
        .close_service
        .close(&key, Utc::now().timestamp_millis())
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(CloseSessionResponse {
                success: true,
                message: outcome.message().to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to close session");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionTurnRequest {
    pub uid: String,
    pub message: String,
    #[serde(default)]
    pub slot: Option<String>,
}

/// Streams the persona's reply as `token` events, then `done`. The finished
/// reply is appended to the session once the stream ends.
#[tracing::instrument(skip(state, payload))]
pub async fn session_turn_handler(
    State(state): State<AppState>,
    payload: Result<Json<SessionTurnRequest>, JsonRejection>,
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
        message = %sanitize_prompt(&request.message),
        "Session turn received"
    );

    let key = session_key(&state, request.uid, request.slot);
    let turn = match state
        .counsel_service
        .begin_turn(key, &request.message, Utc::now().timestamp_millis())
        .await
    {
        Ok(turn) => turn,
        Err(CounselError::EmptyMessage) => {
            return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
        }
        Err(CounselError::UserNotFound(uid)) => {
            return error_response(StatusCode::NOT_FOUND, format!("User not found: {}", uid));
        }
        Err(CounselError::Generation(e)) => {
            tracing::error!(error = %e, "Both models failed to open a reply stream");
            return error_response(StatusCode::GATEWAY_TIMEOUT, GENERATION_RETRY_MESSAGE);
        }
        Err(e) => {
            tracing::error!(error = %e, "Session turn failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let keep_alive_seconds = state.settings.llm.sse_keep_alive_seconds;
    let counsel_service = state.counsel_service.clone();

    let sse_stream = async_stream::stream! {
        let key = turn.key;
        let mut token_stream = turn.reply;
        let mut accumulated_text = String::new();

        while let Some(token_result) = token_stream.next().await {
            match token_result {
                Ok(token) => {
                    accumulated_text.push_str(&token);
                    yield Ok::<_, Infallible>(Event::default().event("token").data(token));
                }
                Err(e) => {
                    tracing::error!(error = %e, "Reply stream failed");
                    yield Ok(Event::default().event("error").data(GENERATION_RETRY_MESSAGE));
                    return;
                }
            }
        }

        if let Err(e) = counsel_service
            .record_reply(&key, &accumulated_text, Utc::now().timestamp_millis())
            .await
        {
            tracing::error!(error = %e, "Failed to store persona reply");
        }
        yield Ok(Event::default().event("done").data("[DONE]"));
    };

    Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(keep_alive_seconds))
                .text("keep-alive"),
        )
        .into_response()
}
