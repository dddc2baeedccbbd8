//! Outbound Ports (Driven Ports)
//!
//! Dependencies the sensor tasking subsystem needs from its environment:
//! a key/value cache with expiry, and the message transport.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::CacheError;

pub use shared_bus::MessageTransport;

/// Key/value cache with per-entry expiry (Driven Port)
///
/// Values are stored as JSON. Writes are last-write-wins per key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read the value under `key`. Expired or missing keys read as `None`.
    async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    /// Write `value` under `key`, expiring after `ttl`.
    async fn put_value(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError>;

    /// Remove `key`. Returns whether it was present.
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;
}

/// Typed helpers over any [`CacheStore`].
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    /// Read and deserialize the value under `key`.
    async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_value(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| CacheError::Serialization {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Serialize and write `item` under `key`, expiring after `ttl`.
    async fn put<T>(&self, key: &str, item: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let value = serde_json::to_value(item).map_err(|source| CacheError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.put_value(key, value, ttl).await
    }
}

impl<C: CacheStore + ?Sized> CacheStoreExt for C {}
