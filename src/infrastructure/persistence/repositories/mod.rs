mod memory_repository;
mod pg_post_repository;
mod pg_session_repository;
mod pg_user_repository;

pub use memory_repository::{
    InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository,
};
pub use pg_post_repository::PgPostRepository;
pub use pg_session_repository::PgSessionRepository;
pub use pg_user_repository::PgUserRepository;
