mod helpers;

use std::sync::Arc;
use std::time::Duration;

use afterword::application::ports::{PostRepository, UserRepository};
use afterword::application::services::{
    ReflectionError, ReflectionRequest, ReflectionService, ReflectionTask,
};
use afterword::domain::{PostId, PostOrigin, PostStatus, UserId};
use tokio::sync::mpsc;

use helpers::{
    FALLBACK_MODEL, PRIMARY_MODEL, ScriptedLlmClient, TestApp, reflection_draft,
};

fn stuck_request(uid: &str) -> ReflectionRequest {
    ReflectionRequest {
        uid: UserId::from(uid),
        rant: "I feel stuck".to_string(),
        counsel: None,
        directives: None,
        is_public: true,
        region: None,
    }
}

async fn wait_for_terminal(app: &TestApp, post_id: PostId) -> PostStatus {
    for _ in 0..100 {
        let post = app.posts.get_by_id(post_id).await.unwrap().unwrap();
        if post.status.is_terminal() {
            return post.status;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("post {} never left processing", post_id);
}

#[tokio::test]
async fn given_reflection_when_enqueuing_then_processing_post_is_returned_before_drafting() {
    let app = TestApp::new(ScriptedLlmClient::new().respond(PRIMARY_MODEL, reflection_draft()))
        .with_user("u1")
        .await;

    let post_id = app
        .state
        .reflection_service
        .enqueue(stuck_request("u1"))
        .await
        .unwrap();

    let post = app.posts.get_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.status, PostStatus::Processing);
    assert_eq!(post.origin, PostOrigin::Reflection);
    assert!(post.public_content.is_none());
    let private = post.private_content.unwrap();
    assert_eq!(private.raw_input, "I feel stuck");
    assert!(private.raw_advice.is_none());
    assert_eq!(app.llm.call_count(), 0);
}

#[tokio::test]
async fn given_running_worker_when_drafting_succeeds_then_post_is_completed_without_media() {
    let mut app = TestApp::new(ScriptedLlmClient::new().respond(PRIMARY_MODEL, reflection_draft()))
        .with_user("u1")
        .await;
    app.spawn_worker();

    let post_id = app
        .state
        .reflection_service
        .enqueue(stuck_request("u1"))
        .await
        .unwrap();

    assert_eq!(wait_for_terminal(&app, post_id).await, PostStatus::Completed);
    let post = app.posts.get_by_id(post_id).await.unwrap().unwrap();
    let content = post.public_content.unwrap();
    assert!(content.letter.starts_with("Dear Auntie Ro"));
    assert!(!content.response.is_empty());
    assert!(content.ai_image_url.is_none());
    assert!(content.stock_image_url.is_none());
    assert_eq!(app.images.call_count(), 0);
}

#[tokio::test]
async fn given_both_models_fail_when_drafting_then_post_is_marked_failed() {
    let mut app = TestApp::new(
        ScriptedLlmClient::new()
            .fail(PRIMARY_MODEL)
            .fail(FALLBACK_MODEL),
    )
    .with_user("u1")
    .await;
    app.spawn_worker();

    let post_id = app
        .state
        .reflection_service
        .enqueue(stuck_request("u1"))
        .await
        .unwrap();

    assert_eq!(wait_for_terminal(&app, post_id).await, PostStatus::Failed);
    let post = app.posts.get_by_id(post_id).await.unwrap().unwrap();
    assert!(post.error_message.unwrap().contains(FALLBACK_MODEL));
    assert!(post.public_content.is_none());
    assert_eq!(app.llm.call_count(), 2);
}

#[tokio::test]
async fn given_directives_and_region_when_enqueuing_then_user_fields_are_updated_first() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let mut request = stuck_request("u1");
    request.directives = Some(vec!["walk daily".to_string()]);
    request.region = Some("Lisbon".to_string());
    request.counsel = Some("Try a smaller step".to_string());
    request.is_public = false;

    let post_id = app
        .state
        .reflection_service
        .enqueue(request)
        .await
        .unwrap();

    let profile = app
        .users
        .get_profile(&UserId::from("u1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.active_directives, vec!["walk daily".to_string()]);
    assert_eq!(profile.region.as_deref(), Some("Lisbon"));

    let post = app.posts.get_by_id(post_id).await.unwrap().unwrap();
    assert!(!post.is_public);
    assert_eq!(post.author.region.as_deref(), Some("Lisbon"));
    assert_eq!(
        post.private_content.unwrap().raw_advice.as_deref(),
        Some("Try a smaller step")
    );
}

#[tokio::test]
async fn given_unknown_user_when_enqueuing_then_rejected_without_post() {
    let app = TestApp::new(ScriptedLlmClient::new());

    let result = app
        .state
        .reflection_service
        .enqueue(stuck_request("ghost"))
        .await;

    assert!(matches!(result, Err(ReflectionError::UserNotFound(_))));
    assert!(app.posts.all().await.is_empty());
}

#[tokio::test]
async fn given_blank_rant_when_enqueuing_then_rejected_without_side_effects() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let mut request = stuck_request("u1");
    request.rant = "   ".to_string();
    request.region = Some("Oslo".to_string());

    let result = app.state.reflection_service.enqueue(request).await;

    assert!(matches!(result, Err(ReflectionError::EmptyReflection)));
    assert!(app.posts.all().await.is_empty());
    let profile = app
        .users
        .get_profile(&UserId::from("u1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.region.as_deref(), Some("Northwest"));
}

#[tokio::test]
async fn given_enqueued_reflection_when_receiving_then_task_carries_persona_and_directives() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let (sender, mut receiver) = mpsc::channel::<ReflectionTask>(1);
    let service = ReflectionService::new(app.users.clone(), app.posts.clone(), sender);
    let mut request = stuck_request("u1");
    request.directives = Some(vec!["sleep earlier".to_string()]);

    let post_id = service.enqueue(request).await.unwrap();
    let task = receiver.recv().await.unwrap();

    assert_eq!(task.post_id, post_id);
    assert_eq!(task.rant, "I feel stuck");
    assert_eq!(task.directives, vec!["sleep earlier".to_string()]);
    assert_eq!(task.character.name, "Auntie Ro");
}

#[tokio::test]
async fn given_closed_queue_when_enqueuing_then_post_is_failed_and_error_returned() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let (sender, receiver) = mpsc::channel::<ReflectionTask>(1);
    drop(receiver);
    let posts = app.posts.clone();
    let service = ReflectionService::new(app.users.clone(), posts.clone(), sender);

    let result = service.enqueue(stuck_request("u1")).await;

    assert!(matches!(result, Err(ReflectionError::QueueUnavailable)));
    let stored = posts.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, PostStatus::Failed);
}

#[tokio::test]
async fn given_full_queue_when_enqueuing_then_returns_without_waiting_and_post_is_failed() {
    let app = TestApp::new(ScriptedLlmClient::new()).with_user("u1").await;
    let (sender, _receiver) = mpsc::channel::<ReflectionTask>(1);
    let posts = app.posts.clone();
    let service = ReflectionService::new(app.users.clone(), posts.clone(), sender);

    let first = service.enqueue(stuck_request("u1")).await.unwrap();
    let second = tokio::time::timeout(
        Duration::from_millis(500),
        service.enqueue(stuck_request("u1")),
    )
    .await
    .expect("enqueue must not wait for queue capacity");

    assert!(matches!(second, Err(ReflectionError::QueueUnavailable)));
    let stored = posts.all().await;
    assert_eq!(stored.len(), 2);
    let queued = stored.iter().find(|post| post.id == first).unwrap();
    assert_eq!(queued.status, PostStatus::Processing);
    let rejected = stored.iter().find(|post| post.id != first).unwrap();
    assert_eq!(rejected.status, PostStatus::Failed);
}

#[tokio::test]
async fn given_completed_post_when_marking_failed_then_transition_is_rejected() {
    let mut app = TestApp::new(ScriptedLlmClient::new().respond(PRIMARY_MODEL, reflection_draft()))
        .with_user("u1")
        .await;
    app.spawn_worker();
    let post_id = app
        .state
        .reflection_service
        .enqueue(stuck_request("u1"))
        .await
        .unwrap();
    wait_for_terminal(&app, post_id).await;

    let posts: Arc<dyn PostRepository> = app.posts.clone();
    let result = posts.mark_failed(post_id, "late failure").await;

    assert!(result.is_err());
    let post = posts.get_by_id(post_id).await.unwrap().unwrap();
    assert_eq!(post.status, PostStatus::Completed);
}
