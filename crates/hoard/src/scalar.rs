//! Read-through scalar caches.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hoard_core::{
    CacheKey, CacheResult, Codec, DynKvStore, Fetcher, JsonCodec, NULL_PAYLOAD, backend_key,
    cache_prefix,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ops::{CacheOps, decode_value, encode_value, fetch_err, store_err};

/// A cache holding one value per key, backed by a fetch function.
///
/// `get` resolves misses through the fetcher and backfills the backend, so
/// repeated reads within the TTL window hit the cache and invoke the
/// fetcher at most once. A fetched null is recorded under the null
/// sentinel when null caching is enabled, so known-null keys are not
/// refetched either.
pub struct ScalarCache<V> {
    name: String,
    ttl: Duration,
    allow_null: bool,
    store: DynKvStore,
    codec: Arc<dyn Codec<V>>,
    fetcher: Arc<dyn Fetcher<V>>,
}

impl<V> std::fmt::Debug for ScalarCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("allow_null", &self.allow_null)
            .finish()
    }
}

impl<V> ScalarCache<V>
where
    V: Send + Sync + 'static,
{
    /// Creates a cache with the default JSON codec.
    pub fn new(
        name: impl Into<String>,
        ttl: Duration,
        store: DynKvStore,
        fetcher: Arc<dyn Fetcher<V>>,
    ) -> Self
    where
        V: Serialize + DeserializeOwned,
    {
        Self::with_codec(name, ttl, store, fetcher, Arc::new(JsonCodec))
    }

    /// Creates a cache with a custom codec.
    pub fn with_codec(
        name: impl Into<String>,
        ttl: Duration,
        store: DynKvStore,
        fetcher: Arc<dyn Fetcher<V>>,
        codec: Arc<dyn Codec<V>>,
    ) -> Self {
        Self {
            name: name.into(),
            ttl,
            allow_null: false,
            store,
            codec,
            fetcher,
        }
    }

    /// Enables caching of null fetch results under the null sentinel.
    #[must_use]
    pub fn allow_nulls(mut self) -> Self {
        self.allow_null = true;
        self
    }

    /// The configured TTL.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key_of(&self, key: &CacheKey) -> String {
        backend_key(&self.name, key, None)
    }

    /// Reads the value for `key`, fetching and backfilling on a miss.
    ///
    /// A hit that fails to decode is surfaced as a serialization error. A
    /// fetched `None` is returned as-is; it is cached only when null
    /// caching is enabled.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Option<V>> {
        let backend_key = self.key_of(key);
        let hit = self
            .store
            .get(&backend_key)
            .await
            .map_err(|e| store_err(&self.name, e))?;

        if let Some(payload) = hit {
            if self.allow_null && payload == NULL_PAYLOAD {
                tracing::debug!(cache = %self.name, key = %backend_key, "cache hit (null)");
                return Ok(None);
            }
            let value = decode_value(&self.name, &backend_key, self.codec.as_ref(), &payload)?;
            tracing::debug!(cache = %self.name, key = %backend_key, "cache hit");
            return Ok(Some(value));
        }

        tracing::debug!(cache = %self.name, key = %backend_key, "cache miss");
        let fresh = self
            .fetcher
            .fetch(key)
            .await
            .map_err(|e| fetch_err(&self.name, e))?;

        match &fresh {
            Some(value) => {
                let payload = encode_value(&self.name, &backend_key, self.codec.as_ref(), value)?;
                self.store
                    .put(&backend_key, &payload, self.ttl)
                    .await
                    .map_err(|e| store_err(&self.name, e))?;
            }
            None if self.allow_null => {
                self.store
                    .put(&backend_key, NULL_PAYLOAD, self.ttl)
                    .await
                    .map_err(|e| store_err(&self.name, e))?;
            }
            None => {}
        }
        Ok(fresh)
    }

    /// Reads the value for `key` without consulting the fetcher.
    ///
    /// Returns `None` both for an absent key and a cached null.
    pub async fn get_if_cached(&self, key: &CacheKey) -> CacheResult<Option<V>> {
        let backend_key = self.key_of(key);
        match self
            .store
            .get(&backend_key)
            .await
            .map_err(|e| store_err(&self.name, e))?
        {
            Some(payload) if self.allow_null && payload == NULL_PAYLOAD => Ok(None),
            Some(payload) => Ok(Some(decode_value(
                &self.name,
                &backend_key,
                self.codec.as_ref(),
                &payload,
            )?)),
            None => Ok(None),
        }
    }

    /// Writes `value` under `key`, overwriting and resetting the TTL.
    pub async fn put(&self, key: &CacheKey, value: &V) -> CacheResult<()> {
        let backend_key = self.key_of(key);
        let payload = encode_value(&self.name, &backend_key, self.codec.as_ref(), value)?;
        self.store
            .put(&backend_key, &payload, self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Writes `value` under `key` only when the key is absent, so a
    /// concurrent writer is not clobbered. Returns `true` when the write
    /// happened.
    pub async fn put_if_absent(&self, key: &CacheKey, value: &V) -> CacheResult<bool> {
        let backend_key = self.key_of(key);
        let payload = encode_value(&self.name, &backend_key, self.codec.as_ref(), value)?;
        self.store
            .put_if_absent(&backend_key, &payload, self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Force-replaces the value under `key`: evict, then put.
    pub async fn refresh(&self, key: &CacheKey, value: &V) -> CacheResult<()> {
        self.invalidate(key).await?;
        self.put(key, value).await
    }

    /// Deletes the entry under `key`. A no-op when absent.
    pub async fn invalidate(&self, key: &CacheKey) -> CacheResult<()> {
        self.store
            .delete(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Resets the TTL of `key` to the cache's configured window. Returns
    /// `false` when the key does not exist.
    pub async fn reset_ttl(&self, key: &CacheKey) -> CacheResult<bool> {
        self.store
            .expire(&self.key_of(key), self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Returns whether an entry exists under `key`.
    pub async fn exists(&self, key: &CacheKey) -> CacheResult<bool> {
        self.store
            .exists(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }
}

#[async_trait]
impl<V> CacheOps for ScalarCache<V>
where
    V: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    async fn clear(&self) -> CacheResult<u64> {
        self.store
            .delete_prefixed(&cache_prefix(&self.name))
            .await
            .map_err(|e| store_err(&self.name, e))
    }
}
