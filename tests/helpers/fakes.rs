use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{Value, json};

use afterword::application::ports::{
    ChatRequest, GenerationRequest, GeneratedImage, ImageGenerator, LlmClient, LlmClientError,
    LlmTokenStream, MediaSourceError, PostRepository, RepositoryError, StockPhotoSearch,
};
use afterword::domain::{Post, PostId, PublicContent};
use afterword::infrastructure::persistence::InMemoryPostRepository;

#[derive(Debug, Clone)]
pub enum RecordedCall {
    Generate {
        model: String,
        request: GenerationRequest,
    },
    Stream {
        model: String,
        request: ChatRequest,
    },
}

impl RecordedCall {
    pub fn model(&self) -> &str {
        match self {
            RecordedCall::Generate { model, .. } | RecordedCall::Stream { model, .. } => model,
        }
    }
}

/// Replies per model from a queue; the last scripted reply repeats. A model with
/// nothing scripted fails.
#[derive(Default)]
pub struct ScriptedLlmClient {
    objects: Mutex<HashMap<String, VecDeque<Option<Value>>>>,
    streams: Mutex<HashMap<String, Option<Vec<String>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, model: &str, value: Value) -> Self {
        self.push(model, Some(value));
        self
    }

    pub fn fail(self, model: &str) -> Self {
        self.push(model, None);
        self
    }

    pub fn stream_tokens(self, model: &str, tokens: &[&str]) -> Self {
        self.streams.lock().unwrap().insert(
            model.to_string(),
            Some(tokens.iter().map(|t| t.to_string()).collect()),
        );
        self
    }

    pub fn push(&self, model: &str, reply: Option<Value>) {
        self.objects
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|call| call.model().to_string())
            .collect()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn generate_object(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<Value, LlmClientError> {
        self.calls.lock().unwrap().push(RecordedCall::Generate {
            model: model.to_string(),
            request: request.clone(),
        });

        let mut objects = self.objects.lock().unwrap();
        let reply = match objects.get_mut(model) {
            Some(queue) if queue.len() > 1 => queue.pop_front().flatten(),
            Some(queue) => queue.front().cloned().flatten(),
            None => None,
        };
        reply.ok_or_else(|| LlmClientError::ApiRequestFailed(format!("{} unavailable", model)))
    }

    async fn stream_text(
        &self,
        model: &str,
        request: &ChatRequest,
    ) -> Result<LlmTokenStream, LlmClientError> {
        self.calls.lock().unwrap().push(RecordedCall::Stream {
            model: model.to_string(),
            request: request.clone(),
        });

        let tokens = self.streams.lock().unwrap().get(model).cloned().flatten();
        match tokens {
            Some(tokens) => Ok(Box::pin(futures::stream::iter(
                tokens.into_iter().map(Ok),
            ))),
            None => Err(LlmClientError::Timeout),
        }
    }
}

pub const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Default)]
pub struct FakeImageGenerator {
    failing: AtomicBool,
    jpeg: AtomicBool,
    calls: AtomicUsize,
}

impl FakeImageGenerator {
    pub fn working() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let generator = Self::default();
        generator.failing.store(true, Ordering::SeqCst);
        generator
    }

    pub fn jpeg() -> Self {
        let generator = Self::default();
        generator.jpeg.store(true, Ordering::SeqCst);
        generator
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FakeImageGenerator {
    async fn generate(&self, _prompt: &str) -> Result<GeneratedImage, MediaSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MediaSourceError::RequestFailed("HTTP 500".to_string()));
        }
        Ok(GeneratedImage {
            bytes: Bytes::from_static(FAKE_PNG),
            content_type: if self.jpeg.load(Ordering::SeqCst) {
                "image/jpeg".to_string()
            } else {
                "image/png".to_string()
            },
        })
    }
}

pub const FAKE_STOCK_URL: &str = "https://images.example.com/photo-1.jpg";

#[derive(Default)]
pub struct FakeStockSearch {
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeStockSearch {
    pub fn working() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let search = Self::default();
        search.failing.store(true, Ordering::SeqCst);
        search
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StockPhotoSearch for FakeStockSearch {
    async fn first_match(&self, _query: &str) -> Result<String, MediaSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MediaSourceError::NoResults);
        }
        Ok(FAKE_STOCK_URL.to_string())
    }
}

pub fn publishable_verdict() -> Value {
    json!({
        "is_publishable": true,
        "post": {
            "title": "The Job I Keep Not Quitting",
            "pseudonym": "Stuck in Second Gear",
            "letter": "Dear Auntie Ro, I have been at the same desk for six years. Signed, Stuck in Second Gear",
            "response": "Dear Stuck, six years is a habit, not a sentence.",
            "image_prompt": "a watercolor of an empty office at dawn",
            "stock_query": "office dawn"
        }
    })
}

pub fn rejected_verdict() -> Value {
    json!({ "is_publishable": false })
}

pub fn reflection_draft() -> Value {
    json!({
        "title": "Stuck",
        "pseudonym": "Idle Engine",
        "letter": "Dear Auntie Ro, I feel stuck. Signed, Idle Engine",
        "response": "Dear Idle Engine, stuck is where moving starts."
    })
}

/// Post repository whose first `failures` creates error; everything else
/// goes to the wrapped in-memory store.
pub struct FailingCreatePostRepository {
    inner: Arc<InMemoryPostRepository>,
    failures_left: AtomicUsize,
}

impl FailingCreatePostRepository {
    pub fn new(inner: Arc<InMemoryPostRepository>, failures: usize) -> Self {
        Self {
            inner,
            failures_left: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl PostRepository for FailingCreatePostRepository {
    async fn create(&self, post: &Post) -> Result<(), RepositoryError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(RepositoryError::ConnectionFailed("post store offline".to_string()));
        }
        self.inner.create(post).await
    }

    async fn get_by_id(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        self.inner.get_by_id(id).await
    }

    async fn complete(&self, id: PostId, content: &PublicContent) -> Result<(), RepositoryError> {
        self.inner.complete(id, content).await
    }

    async fn mark_failed(&self, id: PostId, error_message: &str) -> Result<(), RepositoryError> {
        self.inner.mark_failed(id, error_message).await
    }
}
