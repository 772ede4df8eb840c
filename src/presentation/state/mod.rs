mod app_state;
mod wiring;

pub use app_state::AppState;
pub use wiring::{Collaborators, build_app_state};
