//! Circulation Server
//!
//! REST API server for the library circulation engine.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_circulation::{
    api,
    clock::SystemClock,
    config::{AppConfig, StorageBackend},
    repository::{MemoryStore, PgStore, Repository},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    init_tracing(&config);

    tracing::info!("Starting Circulation Server v{}", env!("CARGO_PKG_VERSION"));

    let repository: Repository = match config.database.backend {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;

            tracing::info!("Database migrations completed");
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState::new(config, repository, Arc::new(SystemClock));
    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "library_circulation={},circulation_server={},tower_http=debug",
            config.logging.level, config.logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
