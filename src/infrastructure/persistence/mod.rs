mod pg_pool;
mod repositories;

pub use repositories::{
    InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository, PgPostRepository,
    PgSessionRepository, PgUserRepository,
};

pub use pg_pool::{create_pool, run_migrations};
