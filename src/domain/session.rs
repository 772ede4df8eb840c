use std::fmt;

use serde::{Deserialize, Serialize};

use super::{TurnRole, UserId};

/// Slot used when a caller does not name one; every user has one counsel session.
pub const DEFAULT_SESSION_SLOT: &str = "counsel";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub uid: UserId,
    pub slot: String,
}

impl SessionKey {
    pub fn new(uid: UserId, slot: impl Into<String>) -> Self {
        Self {
            uid,
            slot: slot.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.uid, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub key: SessionKey,
    pub turns: Vec<Turn>,
    /// Epoch millis of the last turn, or of a forced expiry.
    pub last_activity_ms: i64,
    pub closed: bool,
}

impl Session {
    pub fn new(key: SessionKey, now_ms: i64) -> Self {
        Self {
            key,
            turns: Vec::new(),
            last_activity_ms: now_ms,
            closed: false,
        }
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    /// Appending a turn reopens a closed session.
    pub fn push_turn(&mut self, turn: Turn, now_ms: i64) {
        self.turns.push(turn);
        self.last_activity_ms = now_ms;
        self.closed = false;
    }

    pub fn idle_for_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.last_activity_ms
    }

    pub fn is_eligible(&self, now_ms: i64, idle_threshold_ms: i64) -> bool {
        self.closed || self.idle_for_ms(now_ms) > idle_threshold_ms
    }

    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role.transcript_label(), turn.text.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
