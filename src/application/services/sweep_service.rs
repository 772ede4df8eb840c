use std::sync::Arc;

use crate::application::ports::{RepositoryError, SessionRepository, UserRepository};
use crate::domain::{PostId, Session, UserId, UserProfile};

use super::{EditorialGate, MediaEnrichment, PostPublisher};

#[derive(Debug, Clone, Copy)]
pub struct SweepPolicy {
    pub idle_threshold_ms: i64,
    pub claim_lease_ms: i64,
}

/// Per-run tallies. `published` is what the cron caller sees as `processedCount`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub published: usize,
    pub discarded: usize,
    pub reaped_empty: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum SessionOutcome {
    Untouched,
    ReapedEmpty,
    Skipped,
    Discarded,
    Published,
    Failed,
}

pub struct SweepService {
    user_repository: Arc<dyn UserRepository>,
    session_repository: Arc<dyn SessionRepository>,
    editorial_gate: Arc<EditorialGate>,
    media_enrichment: Arc<MediaEnrichment>,
    post_publisher: Arc<PostPublisher>,
    policy: SweepPolicy,
}

impl SweepService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        session_repository: Arc<dyn SessionRepository>,
        editorial_gate: Arc<EditorialGate>,
        media_enrichment: Arc<MediaEnrichment>,
        post_publisher: Arc<PostPublisher>,
        policy: SweepPolicy,
    ) -> Self {
        Self {
            user_repository,
            session_repository,
            editorial_gate,
            media_enrichment,
            post_publisher,
            policy,
        }
    }

    /// Walks every user's sessions one at a time. Only failing to enumerate users
    /// aborts the run; anything that goes wrong for one session is logged and counted.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, now_ms: i64) -> Result<SweepReport, SweepError> {
        let user_ids = self.user_repository.list_user_ids().await?;
        let mut report = SweepReport::default();

        for uid in user_ids {
            let sessions = match self.session_repository.list_for_user(&uid).await {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::error!(error = %e, uid = %uid, "Failed to list sessions");
                    report.failed += 1;
                    continue;
                }
            };

            if !sessions
                .iter()
                .any(|s| s.is_eligible(now_ms, self.policy.idle_threshold_ms))
            {
                continue;
            }

            let profile = self.load_profile(&uid).await;

            for session in sessions {
                match self.sweep_session(&profile, session, now_ms).await {
                    SessionOutcome::Untouched => {}
                    SessionOutcome::ReapedEmpty => report.reaped_empty += 1,
                    SessionOutcome::Skipped => report.skipped += 1,
                    SessionOutcome::Discarded => report.discarded += 1,
                    SessionOutcome::Published => report.published += 1,
                    SessionOutcome::Failed => report.failed += 1,
                }
            }
        }

        tracing::info!(
            published = report.published,
            discarded = report.discarded,
            reaped_empty = report.reaped_empty,
            skipped = report.skipped,
            failed = report.failed,
            "Sweep finished"
        );
        Ok(report)
    }

    async fn load_profile(&self, uid: &UserId) -> UserProfile {
        match self.user_repository.get_profile(uid).await {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::new(uid.clone()),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    uid = %uid,
                    "Profile unavailable, using default persona"
                );
                UserProfile::new(uid.clone())
            }
        }
    }

    #[tracing::instrument(
        name = "sweep_session",
        skip_all,
        fields(uid = %session.key.uid, slot = %session.key.slot)
    )]
    async fn sweep_session(
        &self,
        profile: &UserProfile,
        session: Session,
        now_ms: i64,
    ) -> SessionOutcome {
        let key = session.key.clone();

        if !session.is_eligible(now_ms, self.policy.idle_threshold_ms) {
            return SessionOutcome::Untouched;
        }

        if session.turn_count() == 0 {
            self.reap(&session).await;
            tracing::info!("Reaped empty session");
            return SessionOutcome::ReapedEmpty;
        }

        match self
            .session_repository
            .try_claim(&key, now_ms, self.policy.claim_lease_ms)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Session claimed by another sweep, skipping");
                return SessionOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to claim session, skipping");
                return SessionOutcome::Skipped;
            }
        }

        let outcome = self.judge_and_publish(profile, &session).await;
        self.reap(&session).await;
        outcome
    }

    async fn judge_and_publish(&self, profile: &UserProfile, session: &Session) -> SessionOutcome {
        let verdict = match self
            .editorial_gate
            .judge(&session.transcript(), &profile.character)
            .await
        {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::error!(error = %e, "Editorial gate failed, abandoning publication");
                return SessionOutcome::Failed;
            }
        };

        let Some(draft) = verdict.into_draft() else {
            tracing::info!("Session not publishable, discarding");
            return SessionOutcome::Discarded;
        };

        let post_id = PostId::new();
        let media = self
            .media_enrichment
            .enrich(&post_id, &draft.image_prompt, &draft.stock_query)
            .await;

        match self
            .post_publisher
            .publish(post_id, profile, draft.post_draft(), media)
            .await
        {
            Ok(_) => SessionOutcome::Published,
            Err(e) => {
                tracing::error!(error = %e, post_id = %post_id, "Publish failed");
                SessionOutcome::Failed
            }
        }
    }

    async fn reap(&self, session: &Session) {
        if let Err(e) = self.session_repository.delete(&session.key).await {
            tracing::warn!(error = %e, "Failed to delete session");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
