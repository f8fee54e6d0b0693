//! List caches: one ordered sequence of values per key.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hoard_core::{
    CacheKey, CacheResult, Codec, DynCollectionStore, JsonCodec, backend_key, cache_prefix,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ops::{CacheOps, decode_value, encode_value, require_values, store_err};

/// A cache storing a head-ordered list of values under each key.
pub struct ListCache<V> {
    name: String,
    ttl: Duration,
    store: DynCollectionStore,
    codec: Arc<dyn Codec<V>>,
}

impl<V> std::fmt::Debug for ListCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<V> ListCache<V>
where
    V: Send + Sync + 'static,
{
    /// Creates a cache with the default JSON codec.
    pub fn new(name: impl Into<String>, ttl: Duration, store: DynCollectionStore) -> Self
    where
        V: Serialize + DeserializeOwned,
    {
        Self::with_codec(name, ttl, store, Arc::new(JsonCodec))
    }

    /// Creates a cache with a custom codec.
    pub fn with_codec(
        name: impl Into<String>,
        ttl: Duration,
        store: DynCollectionStore,
        codec: Arc<dyn Codec<V>>,
    ) -> Self {
        Self {
            name: name.into(),
            ttl,
            store,
            codec,
        }
    }

    fn key_of(&self, key: &CacheKey) -> String {
        backend_key(&self.name, key, None)
    }

    fn encode_all(&self, backend_key: &str, values: &[V]) -> CacheResult<Vec<String>> {
        values
            .iter()
            .map(|value| encode_value(&self.name, backend_key, self.codec.as_ref(), value))
            .collect()
    }

    /// Pushes one value to the head of the list at `key`.
    ///
    /// When `expire` is set the key TTL is reset as part of the same
    /// backend operation; otherwise any existing expiry is left alone.
    pub async fn push(&self, key: &CacheKey, value: &V, expire: bool) -> CacheResult<()> {
        self.push_all(key, std::slice::from_ref(value), expire).await
    }

    /// Pushes values to the head of the list at `key`.
    ///
    /// Values are pushed in slice order, so the last element of the slice
    /// ends up at the head. An empty slice is rejected.
    pub async fn push_all(&self, key: &CacheKey, values: &[V], expire: bool) -> CacheResult<()> {
        require_values(&self.name, values)?;
        let backend_key = self.key_of(key);
        let payloads = self.encode_all(&backend_key, values)?;
        self.store
            .list_push_front(&backend_key, &payloads, expire.then_some(self.ttl))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Reads the whole list at `key`, most recently pushed first. Returns
    /// an empty vector when the key is absent.
    pub async fn get(&self, key: &CacheKey) -> CacheResult<Vec<V>> {
        let backend_key = self.key_of(key);
        let payloads = self
            .store
            .list_range(&backend_key)
            .await
            .map_err(|e| store_err(&self.name, e))?;
        payloads
            .iter()
            .map(|payload| decode_value(&self.name, &backend_key, self.codec.as_ref(), payload))
            .collect()
    }

    /// The length of the list at `key`; zero when absent.
    pub async fn len(&self, key: &CacheKey) -> CacheResult<u64> {
        self.store
            .list_len(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Deletes the list at `key`. A no-op when absent.
    pub async fn invalidate(&self, key: &CacheKey) -> CacheResult<()> {
        self.store
            .delete(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Resets the TTL of `key` to the cache's configured window.
    pub async fn reset_ttl(&self, key: &CacheKey) -> CacheResult<bool> {
        self.store
            .expire(&self.key_of(key), self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }
}

#[async_trait]
impl<V> CacheOps for ListCache<V>
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
