mod helpers;

use std::time::Duration;

use afterword::application::ports::{PostRepository, SessionRepository};
use afterword::domain::{PostId, PostStatus, SessionKey, TurnRole, UserId};
use afterword::presentation::create_router;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use helpers::{
    CRON_SECRET, FALLBACK_MODEL, MINUTE_MS, PRIMARY_MODEL, ScriptedLlmClient, TestApp,
    publishable_verdict, reflection_draft, session_with_turns,
};

fn router(app: &TestApp) -> Router {
    create_router(app.state.clone())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn sweep_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/api/v1/cron/sweep");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn given_running_app_when_checking_health_then_returns_healthy() {
    let app = TestApp::new(ScriptedLlmClient::new());

    let response = router(&app)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn given_missing_or_wrong_token_when_triggering_sweep_then_unauthorized_without_side_effects()
 {
    let app = TestApp::new(ScriptedLlmClient::new().respond(PRIMARY_MODEL, publishable_verdict()))
        .with_user("u1")
        .await;
    let now = Utc::now().timestamp_millis();
    app.sessions
        .save(&session_with_turns("u1", 4, now - 30 * MINUTE_MS))
        .await
        .unwrap();

    for token in [None, Some("wrong-secret")] {
        let response = router(&app).oneshot(sweep_request(token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unauthorized");
    }

    assert_eq!(app.llm.call_count(), 0);
    assert_eq!(app.sessions.len().await, 1);
    assert!(app.posts.all().await.is_empty());
}

#[tokio::test]
async fn given_valid_token_when_triggering_sweep_then_reports_published_count() {
    let app = TestApp::new(ScriptedLlmClient::new().respond(PRIMARY_MODEL, publishable_verdict()))
        .with_user("u1")
        .await
        .with_user("u2")
        .await;
    let now = Utc::now().timestamp_millis();
    app.sessions
        .save(&session_with_turns("u1", 4, now - 30 * MINUTE_MS))
        .await
        .unwrap();
    app.sessions
        .save(&session_with_turns("u2", 4, now - MINUTE_MS))
        .await
        .unwrap();

    let response = router(&app)
        .oneshot(sweep_request(Some(CRON_SECRET)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "success": true, "processedCount": 1 }));
    assert_eq!(app.posts.all().await.len(), 1);
    assert_eq!(app.sessions.len().await, 1);
}

#[tokio::test]
async fn given_inline_post_when_submitted_then_returns_id_and_worker_completes_it() {
    let mut app =
        TestApp::new(ScriptedLlmClient::new().respond(PRIMARY_MODEL, reflection_draft()))
            .with_user("u1")
            .await;
    app.spawn_worker();

    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/posts",
            json!({ "uid": "u1", "rant": "I feel stuck", "isPublic": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let post_id = PostId::from_uuid(Uuid::parse_str(body["postId"].as_str().unwrap()).unwrap());

    let mut status = PostStatus::Processing;
    for _ in 0..100 {
        status = app.posts.get_by_id(post_id).await.unwrap().unwrap().status;
        if status != PostStatus::Processing {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(status, PostStatus::Completed);
}

#[tokio::test]
async fn given_malformed_json_when_submitting_post_then_bad_request() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/posts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"uid\": \"u1\", \"rant\":"))
        .unwrap();
    let response = router(&app).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.posts.all().await.is_empty());
}

#[tokio::test]
async fn given_unknown_user_when_submitting_post_then_not_found() {
    let app = TestApp::new(ScriptedLlmClient::new());

    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/posts",
            json!({ "uid": "ghost", "rant": "hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.posts.all().await.is_empty());
}

#[tokio::test]
async fn given_short_session_when_closing_then_reports_empty_chat_deleted() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let now = Utc::now().timestamp_millis();
    app.sessions
        .save(&session_with_turns("u1", 2, now))
        .await
        .unwrap();

    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/sessions/close",
            json!({ "uid": "u1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({ "success": true, "message": "empty chat deleted" })
    );
    assert!(app.sessions.is_empty().await);
}

#[tokio::test]
async fn given_private_post_when_viewing_then_only_owner_sees_it_with_private_block() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/posts",
            json!({ "uid": "u1", "rant": "secret worries", "isPublic": false }),
        ))
        .await
        .unwrap();
    let post_id = body_json(response).await["postId"]
        .as_str()
        .unwrap()
        .to_string();

    let owner_view = router(&app)
        .oneshot(
            Request::get(format!("/api/v1/posts/{}?uid=u1", post_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(owner_view.status(), StatusCode::OK);
    let body = body_json(owner_view).await;
    assert_eq!(body["status"], "processing");
    assert_eq!(body["privateContent"]["rawInput"], "secret worries");

    let stranger_view = router(&app)
        .oneshot(
            Request::get(format!("/api/v1/posts/{}?uid=u2", post_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stranger_view.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_public_post_when_viewed_anonymously_then_private_block_is_hidden() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/posts",
            json!({ "uid": "u1", "rant": "open worries" }),
        ))
        .await
        .unwrap();
    let post_id = body_json(response).await["postId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = router(&app)
        .oneshot(
            Request::get(format!("/api/v1/posts/{}", post_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["isPublic"], true);
    assert!(body.get("privateContent").is_none());
}

#[tokio::test]
async fn given_invalid_post_id_when_viewing_then_bad_request() {
    let app = TestApp::new(ScriptedLlmClient::new());

    let response = router(&app)
        .oneshot(
            Request::get("/api/v1/posts/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_user_message_when_taking_turn_then_streams_reply_and_appends_both_turns() {
    let app = TestApp::new(
        ScriptedLlmClient::new().stream_tokens(PRIMARY_MODEL, &["Breathe", " first."]),
    )
    .with_user("u1")
    .await;

    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/sessions/turns",
            json!({ "uid": "u1", "message": "I can't sleep" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_text(response).await;
    assert!(text.contains("event: token"));
    assert!(text.contains("data: Breathe"));
    assert!(text.contains("event: done"));

    let session = app
        .sessions
        .get(&SessionKey::new(UserId::from("u1"), "counsel"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.turn_count(), 2);
    assert_eq!(session.turns[0].role, TurnRole::User);
    assert_eq!(session.turns[0].text, "I can't sleep");
    assert_eq!(session.turns[1].role, TurnRole::Assistant);
    assert_eq!(session.turns[1].text, "Breathe first.");
    assert!(!session.closed);
}

#[tokio::test]
async fn given_no_model_can_stream_when_taking_turn_then_gateway_timeout_with_retry_message() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;

    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/sessions/turns",
            json!({ "uid": "u1", "message": "hello?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("try again"));
    assert_eq!(app.llm.models_called(), vec![PRIMARY_MODEL, FALLBACK_MODEL]);
}

#[tokio::test]
async fn given_empty_message_when_taking_turn_then_bad_request_without_model_call() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;

    let response = router(&app)
        .oneshot(json_request(
            "POST",
            "/api/v1/sessions/turns",
            json!({ "uid": "u1", "message": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.llm.call_count(), 0);
}
