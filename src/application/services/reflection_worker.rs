use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::PostRepository;
use crate::domain::MediaUrls;

use super::{ContentSynthesizer, PostPublisher, ReflectionTask};

/// Off-request half of an inline post: drafts the public content and settles the
/// placeholder as `completed` or `failed`.
pub struct ReflectionWorker {
    receiver: mpsc::Receiver<ReflectionTask>,
    executor: ReflectionExecutor,
}

pub struct ReflectionExecutor {
    synthesizer: Arc<ContentSynthesizer>,
    post_publisher: Arc<PostPublisher>,
    post_repository: Arc<dyn PostRepository>,
}

impl ReflectionWorker {
    pub fn new(receiver: mpsc::Receiver<ReflectionTask>, executor: ReflectionExecutor) -> Self {
        Self { receiver, executor }
    }

    pub async fn run(mut self) {
        tracing::info!("Reflection worker started");
        while let Some(task) = self.receiver.recv().await {
            let span = tracing::info_span!(
                "reflection_task",
                post_id = %task.post_id,
                uid = %task.uid,
            );
            self.executor.execute(task).instrument(span).await;
        }
        tracing::info!("Reflection worker stopped: channel closed");
    }
}

impl ReflectionExecutor {
    pub fn new(
        synthesizer: Arc<ContentSynthesizer>,
        post_publisher: Arc<PostPublisher>,
        post_repository: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            synthesizer,
            post_publisher,
            post_repository,
        }
    }

    /// Never returns an error: every failure ends in the post being marked `failed`.
    pub async fn execute(&self, task: ReflectionTask) {
        let draft = self
            .synthesizer
            .draft_reflection(
                &task.rant,
                task.counsel.as_deref(),
                &task.directives,
                &task.character,
            )
            .await;

        let failure = match draft {
            Ok(draft) => match self
                .post_publisher
                .complete_placeholder(task.post_id, draft, MediaUrls::default())
                .await
            {
                Ok(()) => return,
                Err(e) => e.to_string(),
            },
            Err(e) => e.to_string(),
        };

        tracing::error!(error = %failure, "Reflection drafting failed");
        if let Err(e) = self
            .post_repository
            .mark_failed(task.post_id, &failure)
            .await
        {
            tracing::error!(error = %e, "Failed to mark post failed");
        }
    }
}
