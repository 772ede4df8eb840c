use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::warn!(error = %rejection.body_text(), "Rejected malformed request body");
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}
