mod error_response;
mod health;
mod posts;
mod sessions;
mod sweep;

pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use posts::{create_post_handler, post_status_handler};
pub use sessions::{close_session_handler, session_turn_handler};
pub use sweep::sweep_handler;
