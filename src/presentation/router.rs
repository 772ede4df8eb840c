use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::config::StorageProvider;
use crate::presentation::handlers::{
    close_session_handler, create_post_handler, health_handler, post_status_handler,
    session_turn_handler, sweep_handler,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/cron/sweep", get(sweep_handler))
        .route("/api/v1/posts", post(create_post_handler))
        .route("/api/v1/posts/{post_id}", get(post_status_handler))
        .route("/api/v1/sessions/close", post(close_session_handler))
        .route("/api/v1/sessions/turns", post(session_turn_handler));

    if state.settings.storage.provider == StorageProvider::Local {
        router = router.nest_service("/media", ServeDir::new(&state.settings.storage.local_path));
    }

    router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
