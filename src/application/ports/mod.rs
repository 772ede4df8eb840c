mod llm_client;
mod media_source;
mod media_store;
mod post_repository;
mod repository_error;
mod session_repository;
mod user_repository;

pub use llm_client::{
    ChatRequest, ChatTurn, GenerationRequest, LlmClient, LlmClientError, LlmTokenStream,
    SafetyThreshold,
};
pub use media_source::{GeneratedImage, ImageGenerator, MediaSourceError, StockPhotoSearch};
pub use media_store::{MediaStore, MediaStoreError};
pub use post_repository::PostRepository;
pub use repository_error::RepositoryError;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;
