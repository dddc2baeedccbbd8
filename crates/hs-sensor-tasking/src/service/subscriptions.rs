//! Subscription Cache Manager
//!
//! Reads and rewrites per-sensor [`SubscriptionSet`]s held in the cache.
//! A set is only written when a grant or revoke changes it, and every write
//! refreshes its expiry. Concurrent updates to the same sensor are
//! last-write-wins.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{SubscriptionSet, TaskingConfig};
use crate::error::CacheError;
use crate::ports::{CacheStore, CacheStoreExt};

/// Subscription set access over a [`CacheStore`].
pub struct SubscriptionCacheManager<C: CacheStore> {
    cache: Arc<C>,
    config: TaskingConfig,
}

impl<C: CacheStore> SubscriptionCacheManager<C> {
    pub fn new(cache: Arc<C>, config: TaskingConfig) -> Self {
        Self { cache, config }
    }

    /// Current set for `sensor_id`. Absent or expired reads as empty.
    pub async fn get_set(&self, sensor_id: &str) -> Result<SubscriptionSet, CacheError> {
        let key = self.config.subscription_key(sensor_id);
        Ok(self
            .cache
            .get::<SubscriptionSet>(&key)
            .await?
            .unwrap_or_default())
    }

    /// Overwrite the set for `sensor_id`, resetting its expiry.
    pub async fn put_set(&self, sensor_id: &str, set: &SubscriptionSet) -> Result<(), CacheError> {
        let key = self.config.subscription_key(sensor_id);
        self.cache.put(&key, set, self.config.subscription_ttl).await
    }

    /// Authorize `app_id` for broadcasts from `sensor_id`.
    ///
    /// The set is only written, and its expiry only refreshed, when
    /// `app_id` was absent.
    pub async fn grant(&self, sensor_id: &str, app_id: &str) -> Result<SubscriptionSet, CacheError> {
        let mut set = self.get_set(sensor_id).await?;
        if set.grant(app_id) {
            self.put_set(sensor_id, &set).await?;
            debug!(sensor_id, app_id, size = set.len(), "Subscription granted");
        }
        Ok(set)
    }

    /// Withdraw `app_id` from broadcasts of `sensor_id`.
    ///
    /// Nothing is written when `app_id` was not authorized.
    pub async fn revoke(&self, sensor_id: &str, app_id: &str) -> Result<SubscriptionSet, CacheError> {
        let mut set = self.get_set(sensor_id).await?;
        if set.revoke(app_id) {
            self.put_set(sensor_id, &set).await?;
            debug!(sensor_id, app_id, size = set.len(), "Subscription revoked");
        }
        Ok(set)
    }

    /// App ids authorized for `sensor_id`, in grant order.
    pub async fn subscribers(&self, sensor_id: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .get_set(sensor_id)
            .await?
            .iter()
            .map(str::to_string)
            .collect())
    }
}
