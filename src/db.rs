//! Database connection pool management

use anyhow::{Context, Result};
use backoff::ExponentialBackoff;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::str::FromStr;
use std::time::Duration;

use crate::config::Settings;

/// Create a PostgreSQL connection pool.
///
/// The initial connect is retried with exponential backoff for up to a
/// minute so the service can start alongside its database container.
pub async fn create_pool(settings: &Settings) -> Result<PgPool> {
    let database_url = settings
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set")?;

    let connect_options = PgConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .application_name("hatchery-backend");

    let policy = ExponentialBackoff {
        max_elapsed_time: Some(Duration::from_secs(60)),
        ..ExponentialBackoff::default()
    };

    let max_connections = settings.database_max_connections;
    let pool = backoff::future::retry(policy, || {
        let options = connect_options.clone();
        async move {
            PgPoolOptions::new()
                .max_connections(max_connections)
                .min_connections(1)
                .acquire_timeout(Duration::from_secs(5))
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(1800))
                .connect_with(options)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, "PostgreSQL not reachable yet, retrying");
                    backoff::Error::transient(e)
                })
        }
    })
    .await
    .context("Failed to connect to PostgreSQL")?;

    tracing::info!(
        max_connections,
        "Database connection pool established"
    );

    Ok(pool)
}

/// Lightweight health check for database connectivity
pub async fn health_check(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}
