//! Optional Redis read cache for profiles. The store stays the source of truth.

use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::domain::Profile;

/// Profile cache as seen by `ProfileService`.
///
/// `fill` runs after a miss and must never replace an entry that is already
/// there: a slow reader would otherwise put back a profile that an update has
/// just replaced. `refresh` runs after a store write and always overwrites.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn cached(&self, user_id: &str) -> Option<Profile>;
    async fn fill(&self, profile: &Profile) -> Result<()>;
    async fn refresh(&self, profile: &Profile) -> Result<()>;
    async fn evict(&self, user_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
}

impl RedisCache {
    pub async fn new(redis_url: &str, default_ttl_seconds: u64) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Failed to create Redis client")?;

        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            conn,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        })
    }

    #[instrument(skip(self), fields(cache_hit))]
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(value) => {
                    debug!(key = key, "Cache hit");
                    tracing::Span::current().record("cache_hit", true);
                    Some(value)
                }
                Err(e) => {
                    warn!(key = key, error = %e, "Failed to deserialize cached value");
                    tracing::Span::current().record("cache_hit", false);
                    None
                }
            },
            Ok(None) => {
                debug!(key = key, "Cache miss");
                tracing::Span::current().record("cache_hit", false);
                None
            }
            Err(e) => {
                error!(key = key, error = %e, "Redis get error");
                tracing::Span::current().record("cache_hit", false);
                None
            }
        }
    }

    #[instrument(skip(self, value))]
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut conn = self.conn.clone();

        let data = serde_json::to_string(value).context("Failed to serialize value for cache")?;

        conn.set_ex::<_, _, ()>(key, data, self.default_ttl.as_secs())
            .await
            .context("Failed to set cache value")?;

        debug!(key = key, ttl_secs = self.default_ttl.as_secs(), "Cached value");
        Ok(())
    }

    /// `SET NX EX`. Returns false when the key already held a value.
    #[instrument(skip(self, value))]
    pub async fn set_if_absent<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        let mut conn = self.conn.clone();
        let data = serde_json::to_string(value).context("Failed to serialize value for cache")?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(data)
            .arg("NX")
            .arg("EX")
            .arg(self.default_ttl.as_secs())
            .query_async(&mut conn)
            .await
            .context("Failed to set cache value")?;

        let stored = reply.is_some();
        debug!(key = key, stored, "Conditional cache fill");
        Ok(stored)
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .context("Failed to delete cache key")?;
        debug!(key = key, "Deleted cache key");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis health check failed")?;
        Ok(())
    }
}

#[async_trait]
impl ProfileCache for RedisCache {
    async fn cached(&self, user_id: &str) -> Option<Profile> {
        self.get(&keys::profile(user_id)).await
    }

    async fn fill(&self, profile: &Profile) -> Result<()> {
        self.set_if_absent(&keys::profile(&profile.user_id), profile)
            .await
            .map(|_| ())
    }

    async fn refresh(&self, profile: &Profile) -> Result<()> {
        self.set(&keys::profile(&profile.user_id), profile).await
    }

    async fn evict(&self, user_id: &str) -> Result<()> {
        self.delete(&keys::profile(user_id)).await
    }
}

pub mod keys {
    pub fn profile(user_id: &str) -> String {
        format!("profile:{}", user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::keys;

    #[test]
    fn profile_key_format() {
        assert_eq!(keys::profile("abc-123"), "profile:abc-123");
    }
}
