use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{
    ImageGenerator, LlmClient, MediaStore, PostRepository, SessionRepository, StockPhotoSearch,
    UserRepository,
};
use crate::application::services::{
    CloseService, ContentSynthesizer, CounselService, EditorialGate, MediaEnrichment,
    ModelFallback, PostPublisher, ReflectionExecutor, ReflectionService, ReflectionWorker,
    SweepPolicy, SweepService,
};
use crate::presentation::config::Settings;

use super::AppState;

/// Every external collaborator, constructed once at start-up.
#[derive(Clone)]
pub struct Collaborators {
    pub user_repository: Arc<dyn UserRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub post_repository: Arc<dyn PostRepository>,
    pub llm_client: Arc<dyn LlmClient>,
    pub image_generator: Arc<dyn ImageGenerator>,
    pub stock_search: Arc<dyn StockPhotoSearch>,
    pub media_store: Arc<dyn MediaStore>,
}

/// Builds the service graph. The returned worker must be spawned for inline posts to settle.
pub fn build_app_state(
    collaborators: Collaborators,
    settings: Settings,
) -> (AppState, ReflectionWorker) {
    let generator = Arc::new(ModelFallback::new(
        Arc::clone(&collaborators.llm_client),
        settings.llm.primary_model.clone(),
        settings.llm.fallback_model.clone(),
        settings.llm.temperature,
        settings.llm.safety_threshold,
    ));

    let post_publisher = Arc::new(PostPublisher::new(Arc::clone(
        &collaborators.post_repository,
    )));

    let sweep_service = Arc::new(SweepService::new(
        Arc::clone(&collaborators.user_repository),
        Arc::clone(&collaborators.session_repository),
        Arc::new(EditorialGate::new(Arc::clone(&generator))),
        Arc::new(MediaEnrichment::new(
            Arc::clone(&collaborators.image_generator),
            Arc::clone(&collaborators.stock_search),
            Arc::clone(&collaborators.media_store),
        )),
        Arc::clone(&post_publisher),
        SweepPolicy {
            idle_threshold_ms: settings.sweep.idle_threshold_ms(),
            claim_lease_ms: settings.sweep.claim_lease_ms(),
        },
    ));

    let close_service = Arc::new(CloseService::new(
        Arc::clone(&collaborators.session_repository),
        settings.sweep.forced_expiry_ms(),
    ));

    let (sender, receiver) = mpsc::channel(settings.worker.queue_capacity);
    let reflection_service = Arc::new(ReflectionService::new(
        Arc::clone(&collaborators.user_repository),
        Arc::clone(&collaborators.post_repository),
        sender,
    ));
    let reflection_worker = ReflectionWorker::new(
        receiver,
        ReflectionExecutor::new(
            Arc::new(ContentSynthesizer::new(Arc::clone(&generator))),
            post_publisher,
            Arc::clone(&collaborators.post_repository),
        ),
    );

    let counsel_service = Arc::new(CounselService::new(
        Arc::clone(&collaborators.user_repository),
        Arc::clone(&collaborators.session_repository),
        generator,
    ));

    let state = AppState {
        sweep_service,
        close_service,
        reflection_service,
        counsel_service,
        post_repository: collaborators.post_repository,
        settings,
    };

    (state, reflection_worker)
}
