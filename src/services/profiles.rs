//! Profile lifecycle: create, get and partial update over the record store.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::cache::ProfileCache;
use crate::domain::profiles::profile_key;
use crate::domain::{CreateProfileRequest, Profile, UpdateProfileRequest};
use crate::error::{ApiError, ApiResult};
use crate::store::{Record, SharedStore};

#[derive(Clone)]
pub struct ProfileService {
    store: SharedStore,
    cache: Option<Arc<dyn ProfileCache>>,
}

impl ProfileService {
    pub fn new(store: SharedStore, cache: Option<Arc<dyn ProfileCache>>) -> Self {
        Self { store, cache }
    }

    /// Validate and persist a new profile under a freshly generated id.
    #[instrument(skip_all)]
    pub async fn create(&self, req: &CreateProfileRequest) -> ApiResult<Profile> {
        let fields = req.validate()?;

        // v4 ids are random enough that the store is not checked for collisions
        let user_id = Uuid::new_v4().to_string();
        let profile = fields.into_profile(user_id, Utc::now());

        self.save(&profile).await?;
        info!(user_id = %profile.user_id, "Profile created");

        Ok(profile)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: &str) -> ApiResult<Profile> {
        require_user_id(user_id)?;

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.cached(user_id).await {
                debug!(user_id, "Profile cache hit");
                return Ok(cached);
            }
        }

        let profile = self.load(user_id).await?;

        // Only fills an absent key, so an update that landed after the load wins
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.fill(&profile).await {
                warn!(user_id, error = %e, "Failed to cache profile");
            }
        }

        Ok(profile)
    }

    /// Merge the supplied fields into the stored profile.
    ///
    /// Always reads the store, not the cache, so the new `updatedAt` is
    /// ordered after the value actually persisted.
    #[instrument(skip(self, req))]
    pub async fn update(&self, user_id: &str, req: &UpdateProfileRequest) -> ApiResult<Profile> {
        require_user_id(user_id)?;

        let existing = self.load(user_id).await?;
        let updated = req.merge(&existing, Utc::now())?;

        self.save(&updated).await?;
        info!(user_id, "Profile updated");

        Ok(updated)
    }

    async fn load(&self, user_id: &str) -> ApiResult<Profile> {
        let record = self
            .store
            .get(&profile_key(user_id))
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found"))?;

        Ok(record.decode()?)
    }

    /// One store write, then a best-effort cache refresh. If the refresh
    /// fails the entry is evicted so reads fall back to the store.
    async fn save(&self, profile: &Profile) -> ApiResult<()> {
        let record = Record::from_item(profile_key(&profile.user_id), profile)?;
        self.store.put(record).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.refresh(profile).await {
                warn!(user_id = %profile.user_id, error = %e, "Failed to refresh profile cache");
                if let Err(e) = cache.evict(&profile.user_id).await {
                    warn!(user_id = %profile.user_id, error = %e, "Failed to evict profile cache");
                }
            }
        }
        Ok(())
    }
}

fn require_user_id(user_id: &str) -> ApiResult<()> {
    if user_id.trim().is_empty() {
        return Err(ApiError::validation("userId is required"));
    }
    Ok(())
}
