use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ipo_listings_api::api::{self, AppState};
use ipo_listings_api::auth::blacklist;
use ipo_listings_api::auth::jwt::TokenService;
use ipo_listings_api::auth::password::PasswordHasher;
use ipo_listings_api::config::{Config, ConfigError, StorageBackend};
use ipo_listings_api::infrastructure::repositories::InMemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("ipo_listings_api=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(storage = %config.storage, "Configuration loaded");

    let tokens = TokenService::new(
        &config.jwt_secret,
        config.access_token_expiry_secs,
        config.refresh_token_expiry_secs,
    );
    let passwords = PasswordHasher::new(config.bcrypt_cost);

    let state = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            tracing::info!("Database connected successfully");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied");

            AppState::postgres(pool, tokens, passwords)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            AppState::in_memory(InMemoryStore::new(), tokens, passwords)
        }
    };

    let pruner = blacklist::spawn_pruner(
        state.blacklist.clone(),
        Duration::from_secs(config.blacklist_prune_interval_secs),
    );

    let app = api::router(state);

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pruner.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
