use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use afterword::application::ports::{PostRepository, SessionRepository, UserRepository};
use afterword::infrastructure::llm::LlmClientFactory;
use afterword::infrastructure::media::{ImagenClient, UnsplashClient};
use afterword::infrastructure::observability::{TracingConfig, init_tracing};
use afterword::infrastructure::persistence::{
    InMemoryPostRepository, InMemorySessionRepository, InMemoryUserRepository, PgPostRepository,
    PgSessionRepository, PgUserRepository, create_pool, run_migrations,
};
use afterword::infrastructure::storage::MediaStoreFactory;
use afterword::presentation::config::DatabaseSettings;
use afterword::presentation::{Collaborators, Environment, Settings, build_app_state, create_router};

type Repositories = (
    Arc<dyn UserRepository>,
    Arc<dyn SessionRepository>,
    Arc<dyn PostRepository>,
);

async fn create_repositories(settings: &DatabaseSettings) -> anyhow::Result<Repositories> {
    match &settings.url {
        Some(url) => {
            let pool = create_pool(url, settings.max_connections).await?;
            run_migrations(&pool).await?;
            Ok((
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgSessionRepository::new(pool.clone())),
                Arc::new(PgPostRepository::new(pool)),
            ))
        }
        None => {
            tracing::warn!("No database configured, using in-memory repositories");
            Ok((
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemorySessionRepository::new()),
                Arc::new(InMemoryPostRepository::new()),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("Failed to load settings")?;
    settings.validate().map_err(anyhow::Error::msg)?;

    init_tracing(
        TracingConfig::from_settings(environment.as_str(), &settings.logging),
        settings.server.port,
    );

    let (user_repository, session_repository, post_repository) =
        create_repositories(&settings.database).await?;

    let collaborators = Collaborators {
        user_repository,
        session_repository,
        post_repository,
        llm_client: LlmClientFactory::create(&settings.llm)?,
        image_generator: Arc::new(ImagenClient::from_settings(&settings.media)),
        stock_search: Arc::new(UnsplashClient::from_settings(&settings.media)),
        media_store: MediaStoreFactory::create(&settings.storage)?,
    };

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let (state, reflection_worker) = build_app_state(collaborators, settings);
    tokio::spawn(reflection_worker.run());

    let router = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
