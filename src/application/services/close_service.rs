use std::sync::Arc;

use crate::application::ports::{RepositoryError, SessionRepository};
use crate::domain::SessionKey;

/// Sessions at or below this many turns are dropped on close without a sweep.
pub const EMPTY_SESSION_MAX_TURNS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    NoSession,
    Deleted,
    ScheduledForSweep,
}

impl CloseOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CloseOutcome::NoSession => "no active chat",
            CloseOutcome::Deleted => "empty chat deleted",
            CloseOutcome::ScheduledForSweep => "chat closed",
        }
    }
}

pub struct CloseService {
    session_repository: Arc<dyn SessionRepository>,
    forced_expiry_ms: i64,
}

impl CloseService {
    pub fn new(session_repository: Arc<dyn SessionRepository>, forced_expiry_ms: i64) -> Self {
        Self {
            session_repository,
            forced_expiry_ms,
        }
    }

    #[tracing::instrument(skip(self), fields(uid = %key.uid, slot = %key.slot))]
    pub async fn close(&self, key: &SessionKey, now_ms: i64) -> Result<CloseOutcome, CloseError> {
        let Some(session) = self.session_repository.get(key).await? else {
            return Ok(CloseOutcome::NoSession);
        };

        if session.turn_count() <= EMPTY_SESSION_MAX_TURNS {
            self.session_repository.delete(key).await?;
            tracing::info!(turns = session.turn_count(), "Deleted short session on close");
            return Ok(CloseOutcome::Deleted);
        }

        match self
            .session_repository
            .set_activity(key, now_ms - self.forced_expiry_ms, true)
            .await
        {
            Ok(()) => {}
            // Reaped by a sweep after the read above.
            Err(RepositoryError::NotFound(_)) => {
                tracing::info!("Session reaped before close, nothing to expire");
                return Ok(CloseOutcome::NoSession);
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(turns = session.turn_count(), "Session expired for next sweep");
        Ok(CloseOutcome::ScheduledForSweep)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CloseError {
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
