#![allow(dead_code, unused_imports)]

mod fakes;
mod test_app;

pub use fakes::{
    FAKE_PNG, FAKE_STOCK_URL, FailingCreatePostRepository, FakeImageGenerator, FakeStockSearch, RecordedCall,
    ScriptedLlmClient, publishable_verdict, reflection_draft, rejected_verdict,
};
pub use test_app::{
    CRON_SECRET, FALLBACK_MODEL, MEDIA_BASE_URL, PRIMARY_MODEL, TestApp, test_settings,
};

use afterword::domain::{Session, SessionKey, Turn, TurnRole, UserId};

pub const MINUTE_MS: i64 = 60 * 1000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

pub fn session_with_turns(uid: &str, turns: usize, last_activity_ms: i64) -> Session {
    let key = SessionKey::new(UserId::from(uid), "counsel");
    let mut session = Session::new(key, last_activity_ms);
    for i in 0..turns {
        let role = if i % 2 == 0 {
            TurnRole::User
        } else {
            TurnRole::Assistant
        };
        session.turns.push(Turn::new(role, format!("turn {}", i)));
    }
    session
}
