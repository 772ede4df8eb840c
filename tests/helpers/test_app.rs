use std::sync::Arc;

use afterword::application::ports::{PostRepository, SafetyThreshold};
use afterword::application::services::ReflectionWorker;
use afterword::domain::{UserId, UserProfile};
use afterword::infrastructure::persistence::{
    InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository,
};
use afterword::infrastructure::storage::InMemoryMediaStore;
use afterword::presentation::config::{
    DatabaseSettings, LlmProvider, LlmSettings, LoggingSettings, MediaSettings, ServerSettings,
    Settings, StorageProvider, StorageSettings, SweepSettings, WorkerSettings,
};
use afterword::presentation::{AppState, Collaborators, build_app_state};

use super::{
    FailingCreatePostRepository, FakeImageGenerator, FakeStockSearch, ScriptedLlmClient,
};

pub const PRIMARY_MODEL: &str = "primary-model";
pub const FALLBACK_MODEL: &str = "fallback-model";
pub const CRON_SECRET: &str = "test-cron-secret";
pub const MEDIA_BASE_URL: &str = "https://media.example.com";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: None,
            max_connections: 1,
        },
        llm: LlmSettings {
            provider: LlmProvider::Gemini,
            api_key: "test-key".to_string(),
            base_url: None,
            azure_endpoint: None,
            primary_model: PRIMARY_MODEL.to_string(),
            fallback_model: FALLBACK_MODEL.to_string(),
            max_tokens: 512,
            temperature: 0.7,
            safety_threshold: SafetyThreshold::BlockMediumAndAbove,
            sse_keep_alive_seconds: 15,
        },
        media: MediaSettings {
            image_endpoint: "http://127.0.0.1:1/predict".to_string(),
            image_api_key: None,
            sample_count: 1,
            aspect_ratio: "16:9".to_string(),
            stock_endpoint: "http://127.0.0.1:1/search".to_string(),
            stock_access_key: None,
        },
        storage: StorageSettings {
            provider: StorageProvider::Azure,
            local_path: "./media".to_string(),
            public_base_url: MEDIA_BASE_URL.to_string(),
            azure_account: None,
            azure_access_key: None,
            azure_container: None,
        },
        sweep: SweepSettings {
            cron_secret: CRON_SECRET.to_string(),
            idle_threshold_minutes: 15,
            forced_expiry_hours: 24,
            claim_lease_minutes: 10,
            default_slot: "counsel".to_string(),
        },
        worker: WorkerSettings { queue_capacity: 8 },
        logging: LoggingSettings {
            level: "info".to_string(),
            enable_json: false,
        },
    }
}

/// Full service graph over in-memory collaborators.
pub struct TestApp {
    pub users: Arc<InMemoryUserRepository>,
    pub sessions: Arc<InMemorySessionRepository>,
    pub posts: Arc<InMemoryPostRepository>,
    pub llm: Arc<ScriptedLlmClient>,
    pub images: Arc<FakeImageGenerator>,
    pub stock: Arc<FakeStockSearch>,
    pub media_store: Arc<InMemoryMediaStore>,
    pub state: AppState,
    pub worker: Option<ReflectionWorker>,
}

impl TestApp {
    pub fn new(llm: ScriptedLlmClient) -> Self {
        Self::with_media(llm, FakeImageGenerator::working(), FakeStockSearch::working())
    }

    pub fn with_media(
        llm: ScriptedLlmClient,
        images: FakeImageGenerator,
        stock: FakeStockSearch,
    ) -> Self {
        let posts = Arc::new(InMemoryPostRepository::new());
        Self::build(llm, images, stock, posts.clone(), posts)
    }

    /// The first `failures` post creates error; `posts` still sees the rest.
    pub fn with_failing_post_creates(llm: ScriptedLlmClient, failures: usize) -> Self {
        let posts = Arc::new(InMemoryPostRepository::new());
        let post_repository = Arc::new(FailingCreatePostRepository::new(posts.clone(), failures));
        Self::build(
            llm,
            FakeImageGenerator::working(),
            FakeStockSearch::working(),
            posts,
            post_repository,
        )
    }

    fn build(
        llm: ScriptedLlmClient,
        images: FakeImageGenerator,
        stock: FakeStockSearch,
        posts: Arc<InMemoryPostRepository>,
        post_repository: Arc<dyn PostRepository>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(InMemorySessionRepository::new());
        let llm = Arc::new(llm);
        let images = Arc::new(images);
        let stock = Arc::new(stock);
        let media_store = Arc::new(InMemoryMediaStore::new(MEDIA_BASE_URL));

        let collaborators = Collaborators {
            user_repository: users.clone(),
            session_repository: sessions.clone(),
            post_repository,
            llm_client: llm.clone(),
            image_generator: images.clone(),
            stock_search: stock.clone(),
            media_store: media_store.clone(),
        };
        let (state, worker) = build_app_state(collaborators, test_settings());

        Self {
            users,
            sessions,
            posts,
            llm,
            images,
            stock,
            media_store,
            state,
            worker: Some(worker),
        }
    }

    pub async fn with_user(self, uid: &str) -> Self {
        let mut profile = UserProfile::new(UserId::from(uid));
        profile.region = Some("Northwest".to_string());
        profile.display_name = Some("Reader".to_string());
        self.users.insert(profile).await;
        self
    }

    pub fn spawn_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            tokio::spawn(worker.run());
        }
    }
}
