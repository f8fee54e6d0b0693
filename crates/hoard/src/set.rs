//! Set caches: one deduplicated member set per key.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hoard_core::{
    CacheKey, CacheResult, Codec, DynCollectionStore, JsonCodec, backend_key, cache_prefix,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ops::{CacheOps, decode_value, encode_value, require_values, store_err};

/// A cache storing a set of values under each key.
///
/// Deduplication happens in the backend on the encoded payloads, so two
/// values are the same member iff they encode identically.
pub struct SetCache<V> {
    name: String,
    ttl: Duration,
    store: DynCollectionStore,
    codec: Arc<dyn Codec<V>>,
}

impl<V> SetCache<V>
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

    /// Adds one value to the set at `key`, resetting the key TTL.
    pub async fn add(&self, key: &CacheKey, value: &V) -> CacheResult<()> {
        self.add_all(key, std::slice::from_ref(value)).await
    }

    /// Adds values to the set at `key`, resetting the key TTL. Duplicates
    /// are absorbed by the backend. An empty slice is rejected.
    pub async fn add_all(&self, key: &CacheKey, values: &[V]) -> CacheResult<()> {
        require_values(&self.name, values)?;
        let backend_key = self.key_of(key);
        let payloads = self.encode_all(&backend_key, values)?;
        self.store
            .set_add(&backend_key, &payloads, self.ttl)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Removes one value from the set at `key`.
    pub async fn remove(&self, key: &CacheKey, value: &V) -> CacheResult<()> {
        self.remove_all(key, std::slice::from_ref(value)).await
    }

    /// Removes values from the set at `key`. Absent members are ignored.
    pub async fn remove_all(&self, key: &CacheKey, values: &[V]) -> CacheResult<()> {
        require_values(&self.name, values)?;
        let backend_key = self.key_of(key);
        let payloads = self.encode_all(&backend_key, values)?;
        self.store
            .set_remove(&backend_key, &payloads)
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Reads all members of the set at `key`. Empty when absent.
    pub async fn members(&self, key: &CacheKey) -> CacheResult<HashSet<V>>
    where
        V: Eq + Hash,
    {
        let backend_key = self.key_of(key);
        let payloads = self
            .store
            .set_members(&backend_key)
            .await
            .map_err(|e| store_err(&self.name, e))?;
        payloads
            .iter()
            .map(|payload| decode_value(&self.name, &backend_key, self.codec.as_ref(), payload))
            .collect()
    }

    /// The cardinality of the set at `key`; zero when absent.
    pub async fn len(&self, key: &CacheKey) -> CacheResult<u64> {
        self.store
            .set_len(&self.key_of(key))
            .await
            .map_err(|e| store_err(&self.name, e))
    }

    /// Deletes the set at `key`. A no-op when absent.
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
impl<V> CacheOps for SetCache<V>
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
