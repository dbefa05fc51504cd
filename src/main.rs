mod api;
mod app;
mod config;
mod db;
mod domain;
mod error;
mod logging;
mod middleware;
mod routes;
mod services;
mod store;

use anyhow::Result;

use services::RedisCache;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        store_backend = ?settings.store_backend,
        table = %settings.table_name,
        "Starting hatchery backend"
    );

    // Record store, shared by every resource service
    let store = store::connect(&settings).await?;

    // Redis is optional; without it profile reads always hit the store
    let cache = match &settings.redis_url {
        Some(url) => {
            let cache = RedisCache::new(url, settings.redis_cache_ttl_seconds).await?;
            tracing::info!("Redis cache initialized");
            Some(cache)
        }
        None => {
            tracing::info!("REDIS_URL not set, profile cache disabled");
            None
        }
    };

    // Create application state
    let state = app::AppState::new(settings.clone(), store, cache);

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
