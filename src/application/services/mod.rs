mod close_service;
mod content_synthesizer;
mod counsel_service;
mod editorial_gate;
mod media_enrichment;
mod model_fallback;
mod post_publisher;
pub mod prompts;
mod reflection_service;
mod reflection_worker;
mod sweep_service;

pub use close_service::{CloseError, CloseOutcome, CloseService, EMPTY_SESSION_MAX_TURNS};
pub use content_synthesizer::{ContentSynthesizer, SynthesisError};
pub use counsel_service::{CounselError, CounselService, CounselTurn};
pub use editorial_gate::{EditorialError, EditorialGate};
pub use media_enrichment::MediaEnrichment;
pub use model_fallback::ModelFallback;
pub use post_publisher::{PostPublisher, PublishError, author_of};
pub use reflection_service::{
    ReflectionError, ReflectionRequest, ReflectionService, ReflectionTask,
};
pub use reflection_worker::{ReflectionExecutor, ReflectionWorker};
pub use sweep_service::{SweepError, SweepPolicy, SweepReport, SweepService};
