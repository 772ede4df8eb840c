use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

use crate::presentation::state::AppState;

use super::error_response::error_response;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResponse {
    pub success: bool,
    pub processed_count: usize,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

#[tracing::instrument(skip(state, headers))]
pub async fn sweep_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let expected = state.settings.sweep.cron_secret.as_str();
    match bearer_token(&headers) {
        Some(token) if !expected.is_empty() && token == expected => {}
        _ => {
            tracing::warn!("Sweep trigger rejected: bad bearer token");
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    }

    match state
        .sweep_service
        .run(Utc::now().timestamp_millis())
        .await
    {
        Ok(report) => (
            StatusCode::OK,
            Json(SweepResponse {
                success: true,
                processed_count: report.published,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Sweep failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
