use std::sync::Arc;

use chrono::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_api::{
    api::{create_router, AppState},
    config::{Config, StorageBackend},
    db::{create_pool, create_redis_client, Cache, CachedProductStore, PgStore},
    services::auth::TokenSigner,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let tokens = TokenSigner::new(
        config.token_secret.clone(),
        Duration::minutes(config.token_ttl_minutes),
    );

    let mut state = match config.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            tracing::info!("Connected to PostgreSQL");
            AppState::new(Arc::new(PgStore::new(pool)), tokens)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will not survive a restart");
            AppState::in_memory(tokens)
        }
    }
    .with_admin_email(config.admin_email.clone());

    // Product reads go through Redis when it is configured
    let cache_writer = match &config.redis_url {
        Some(redis_url) => {
            let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
            let cached = CachedProductStore::new(state.products.clone(), cache);
            state = state.with_products(Arc::new(cached));
            tracing::info!("Product cache enabled");
            Some(handle)
        }
        None => None,
    };

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
